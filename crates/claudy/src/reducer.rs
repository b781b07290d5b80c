//! Reducer actions, side-effect intents, and transition logic for the Claudy widget.

use thiserror::Error;

use crate::model::{ClaudyState, IntentMount, TRANSFORM_PROPERTY};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Actions accepted by [`reduce_claudy`].
pub enum ClaudyAction {
    /// The user or the host asked to toggle the panel.
    Toggle {
        /// Host-owned `opened` prop at the time of the toggle.
        opened: bool,
    },
    /// The intent frame signalled it is ready.
    IntentReady,
    /// The running intent terminated and handed back its frame-removal handle.
    IntentTerminated,
    /// The intent could not be started.
    IntentFailed {
        /// Display form of the failure.
        error: String,
    },
    /// A CSS transition ended on the mount region.
    TransitionEnded {
        /// `propertyName` of the transition event.
        property_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side effects requested by the reducer, run in order by the controller.
pub enum ClaudyEffect {
    /// Start the `CLAUDY` intent against the mount region.
    StartIntent,
    /// Call the host's `on_toggle`.
    NotifyToggle,
    /// Remove the mounted intent frame.
    RemoveIntentFrame,
    /// Surface an error to the host.
    ReportError(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Transitions rejected by [`reduce_claudy`].
pub enum ClaudyError {
    /// A toggle arrived while the intent is still loading.
    #[error("intent is still loading")]
    IntentPending,
    /// An intent completion arrived with no intent in flight.
    #[error("intent completion without a pending intent")]
    UnexpectedIntentCompletion,
}

/// Applies a [`ClaudyAction`] to `state` and collects the resulting side effects.
///
/// # Errors
///
/// Returns [`ClaudyError::IntentPending`] for toggles during the first activation and
/// [`ClaudyError::UnexpectedIntentCompletion`] for intent completions nothing is waiting for.
/// `state` is left untouched on error.
pub fn reduce_claudy(
    state: &mut ClaudyState,
    action: ClaudyAction,
) -> Result<Vec<ClaudyEffect>, ClaudyError> {
    let mut effects = Vec::new();
    match action {
        ClaudyAction::Toggle { opened } => {
            if state.mount == IntentMount::Loading {
                return Err(ClaudyError::IntentPending);
            }
            if state.needs_intent(opened) {
                state.is_loading = true;
                state.mount = IntentMount::Loading;
                state.last_error = None;
                effects.push(ClaudyEffect::StartIntent);
            } else {
                state.is_active = !state.is_active;
                state.flipped_since_mount = true;
                effects.push(ClaudyEffect::NotifyToggle);
            }
        }
        ClaudyAction::IntentReady => {
            if state.mount != IntentMount::Loading {
                return Err(ClaudyError::UnexpectedIntentCompletion);
            }
            state.is_loading = false;
            state.is_active = true;
            state.mount = IntentMount::Mounted;
            state.flipped_since_mount = false;
            effects.push(ClaudyEffect::NotifyToggle);
        }
        ClaudyAction::IntentTerminated => {
            if state.mount == IntentMount::Empty || state.close_listener_armed {
                return Err(ClaudyError::UnexpectedIntentCompletion);
            }
            // The host closes its panel; the frame goes once the closing transition ends.
            state.close_listener_armed = true;
            effects.push(ClaudyEffect::NotifyToggle);
        }
        ClaudyAction::IntentFailed { error } => match state.mount {
            IntentMount::Empty => return Err(ClaudyError::UnexpectedIntentCompletion),
            IntentMount::Loading => {
                state.is_loading = false;
                state.is_active = false;
                state.mount = IntentMount::Empty;
                state.close_listener_armed = false;
                state.last_error = Some(error.clone());
                effects.push(ClaudyEffect::ReportError(error));
            }
            IntentMount::Mounted => {
                state.last_error = Some(error.clone());
                effects.push(ClaudyEffect::ReportError(error));
            }
        },
        ClaudyAction::TransitionEnded { property_name } => {
            if !state.close_listener_armed || property_name != TRANSFORM_PROPERTY {
                return Ok(effects);
            }
            // Removing the frame empties the mount region, so the next toggle loads a fresh intent.
            state.close_listener_armed = false;
            state.is_active = false;
            state.is_loading = false;
            state.mount = IntentMount::Empty;
            state.flipped_since_mount = false;
            effects.push(ClaudyEffect::RemoveIntentFrame);
        }
    }
    Ok(effects)
}
