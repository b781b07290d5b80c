/// CSS property whose transition end closes the assistant panel.
pub const TRANSFORM_PROPERTY: &str = "transform";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntentMount {
    #[default]
    Empty,
    Loading,
    Mounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaudyPhase {
    Closed,
    Loading,
    ActiveFirstTime,
    ActiveToggledOpen,
    ActiveToggledClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaudyState {
    pub is_loading: bool,
    pub is_active: bool,
    pub mount: IntentMount,
    pub close_listener_armed: bool,
    pub flipped_since_mount: bool,
    pub last_error: Option<String>,
}

impl ClaudyState {
    pub fn phase(&self) -> ClaudyPhase {
        match self.mount {
            IntentMount::Empty if self.is_active => ClaudyPhase::ActiveToggledOpen,
            IntentMount::Empty => ClaudyPhase::Closed,
            IntentMount::Loading => ClaudyPhase::Loading,
            IntentMount::Mounted if !self.flipped_since_mount => ClaudyPhase::ActiveFirstTime,
            IntentMount::Mounted if self.is_active => ClaudyPhase::ActiveToggledOpen,
            IntentMount::Mounted => ClaudyPhase::ActiveToggledClosed,
        }
    }

    /// Whether the next toggle has to load the intent first.
    pub fn needs_intent(&self, opened: bool) -> bool {
        self.mount == IntentMount::Empty && !opened
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn phase_follows_mount_and_activity() {
        let mut state = ClaudyState::default();
        assert_eq!(state.phase(), ClaudyPhase::Closed);

        state.mount = IntentMount::Loading;
        assert_eq!(state.phase(), ClaudyPhase::Loading);

        state.mount = IntentMount::Mounted;
        state.is_active = true;
        assert_eq!(state.phase(), ClaudyPhase::ActiveFirstTime);

        state.flipped_since_mount = true;
        state.is_active = false;
        assert_eq!(state.phase(), ClaudyPhase::ActiveToggledClosed);
        state.is_active = true;
        assert_eq!(state.phase(), ClaudyPhase::ActiveToggledOpen);
    }

    #[test]
    fn only_a_closed_empty_widget_needs_the_intent() {
        let state = ClaudyState::default();
        assert!(state.needs_intent(false));
        assert!(!state.needs_intent(true));

        let mounted = ClaudyState {
            mount: IntentMount::Mounted,
            ..ClaudyState::default()
        };
        assert!(!mounted.needs_intent(false));
    }
}
