//! Drives [`reduce_claudy`] and runs the effects it requests against the host services.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use bar_host::{IntentHandle, IntentRequest, IntentService};
use futures::task::{LocalSpawn, LocalSpawnExt};
use leptos::logging;

use crate::{
    model::ClaudyState,
    reducer::{reduce_claudy, ClaudyAction, ClaudyEffect},
};

type ToggleHook = Rc<dyn Fn()>;
type ErrorHook = Rc<dyn Fn(String)>;
type ChangeHook = Rc<dyn Fn(&ClaudyState)>;

#[derive(Clone, Default)]
/// Host notifications raised by a [`ClaudyController`].
pub struct ClaudyHooks {
    on_toggle: Option<ToggleHook>,
    on_error: Option<ErrorHook>,
    on_change: Option<ChangeHook>,
}

impl ClaudyHooks {
    /// Called every time the panel is shown or hidden.
    pub fn on_toggle(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_toggle = Some(Rc::new(hook));
        self
    }

    /// Called when the intent cannot be started. Errors are logged when unset.
    pub fn on_error(mut self, hook: impl Fn(String) + 'static) -> Self {
        self.on_error = Some(Rc::new(hook));
        self
    }

    /// Called with the new state after every state change.
    pub fn on_change(mut self, hook: impl Fn(&ClaudyState) + 'static) -> Self {
        self.on_change = Some(Rc::new(hook));
        self
    }
}

struct ControllerInner {
    state: RefCell<ClaudyState>,
    intents: Rc<dyn IntentService>,
    spawner: Rc<dyn LocalSpawn>,
    mount_id: String,
    frame: RefCell<Option<IntentHandle>>,
    alive: Cell<bool>,
    hooks: ClaudyHooks,
}

#[derive(Clone)]
/// State owner for one mounted widget.
///
/// Every transition goes through [`reduce_claudy`]. Completions that arrive after
/// [`Self::unmount`] are dropped.
pub struct ClaudyController {
    inner: Rc<ControllerInner>,
}

impl fmt::Debug for ClaudyController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudyController")
            .field("state", &self.inner.state.borrow())
            .field("mount_id", &self.inner.mount_id)
            .field("alive", &self.inner.alive.get())
            .finish_non_exhaustive()
    }
}

impl ClaudyController {
    /// Creates a controller whose intent mounts into the element with id `mount_id`.
    pub fn new(
        intents: Rc<dyn IntentService>,
        spawner: Rc<dyn LocalSpawn>,
        mount_id: impl Into<String>,
        hooks: ClaudyHooks,
    ) -> Self {
        Self {
            inner: Rc::new(ControllerInner {
                state: RefCell::new(ClaudyState::default()),
                intents,
                spawner,
                mount_id: mount_id.into(),
                frame: RefCell::new(None),
                alive: Cell::new(true),
                hooks,
            }),
        }
    }

    pub fn state(&self) -> ClaudyState {
        self.inner.state.borrow().clone()
    }

    pub fn mount_id(&self) -> &str {
        &self.inner.mount_id
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    /// Toggles the panel, loading the intent on first use.
    pub fn toggle(&self, opened: bool) {
        self.dispatch(ClaudyAction::Toggle { opened });
    }

    /// Reports a `transitionend` on the mount region.
    pub fn transition_ended(&self, property_name: &str) {
        self.dispatch(ClaudyAction::TransitionEnded {
            property_name: property_name.to_string(),
        });
    }

    /// Stops state updates and host notifications for good.
    pub fn unmount(&self) {
        self.inner.alive.set(false);
        self.inner.frame.borrow_mut().take();
    }

    fn dispatch(&self, action: ClaudyAction) {
        if !self.is_alive() {
            return;
        }
        let outcome = {
            let mut state = self.inner.state.borrow_mut();
            let previous = state.clone();
            reduce_claudy(&mut state, action).map(|effects| {
                let changed = (*state != previous).then(|| state.clone());
                (effects, changed)
            })
        };

        match outcome {
            Ok((effects, changed)) => {
                if let (Some(state), Some(on_change)) = (changed, &self.inner.hooks.on_change) {
                    on_change(&state);
                }
                for effect in effects {
                    self.run_effect(effect);
                }
            }
            Err(err) => logging::warn!("claudy reducer error: {err}"),
        }
    }

    fn run_effect(&self, effect: ClaudyEffect) {
        match effect {
            ClaudyEffect::StartIntent => self.start_intent(),
            ClaudyEffect::NotifyToggle => {
                if let Some(on_toggle) = &self.inner.hooks.on_toggle {
                    on_toggle();
                }
            }
            ClaudyEffect::RemoveIntentFrame => {
                let frame = self.inner.frame.borrow_mut().take();
                if let Some(Err(err)) = frame.map(|frame| frame.remove_intent_frame()) {
                    logging::warn!("claudy intent frame removal failed: {err}");
                }
            }
            ClaudyEffect::ReportError(error) => match &self.inner.hooks.on_error {
                Some(on_error) => on_error(error),
                None => logging::warn!("claudy intent failed: {error}"),
            },
        }
    }

    fn start_intent(&self) {
        let controller = self.clone();
        let ready = self.clone();
        let task = async move {
            let request = IntentRequest::claudy();
            let intents = controller.inner.intents.clone();
            let on_ready = Box::new(move || ready.dispatch(ClaudyAction::IntentReady));
            match intents
                .start(&request, &controller.inner.mount_id, on_ready)
                .await
            {
                Ok(frame) => {
                    if !controller.is_alive() {
                        return;
                    }
                    controller.inner.frame.replace(Some(frame));
                    controller.dispatch(ClaudyAction::IntentTerminated);
                }
                Err(error) => controller.dispatch(ClaudyAction::IntentFailed { error }),
            }
        };

        if let Err(err) = self.inner.spawner.spawn_local(task) {
            self.dispatch(ClaudyAction::IntentFailed {
                error: err.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use bar_host::{MemoryIntentService, CLAUDY_INTENT_ACTION, CLAUDY_INTENT_DOCTYPE};
    use futures::executor::LocalPool;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{ClaudyPhase, IntentMount, TRANSFORM_PROPERTY};

    struct Harness {
        pool: LocalPool,
        intents: MemoryIntentService,
        toggles: Rc<Cell<usize>>,
        errors: Rc<RefCell<Vec<String>>>,
        controller: ClaudyController,
    }

    fn harness_with(intents: MemoryIntentService) -> Harness {
        let pool = LocalPool::new();
        let toggles = Rc::new(Cell::new(0));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let hooks = ClaudyHooks::default()
            .on_toggle({
                let toggles = toggles.clone();
                move || toggles.set(toggles.get() + 1)
            })
            .on_error({
                let errors = errors.clone();
                move |error| errors.borrow_mut().push(error)
            });
        let controller = ClaudyController::new(
            Rc::new(intents.clone()),
            Rc::new(pool.spawner()),
            "coz-claudy-intent-1",
            hooks,
        );
        Harness {
            pool,
            intents,
            toggles,
            errors,
            controller,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryIntentService::default())
    }

    #[test]
    fn first_toggle_loads_the_intent_and_notifies_once() {
        let mut h = harness();

        h.controller.toggle(false);
        assert!(h.controller.state().is_loading);
        assert_eq!(h.toggles.get(), 0);

        h.pool.run_until_stalled();

        let state = h.controller.state();
        assert!(!state.is_loading);
        assert!(state.is_active);
        assert_eq!(state.phase(), ClaudyPhase::ActiveFirstTime);
        assert_eq!(h.toggles.get(), 1);

        let starts = h.intents.starts();
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].0.action, CLAUDY_INTENT_ACTION);
        assert_eq!(starts[0].0.doctype, CLAUDY_INTENT_DOCTYPE);
        assert!(starts[0].0.expose_frame_removal);
        assert_eq!(starts[0].1, "coz-claudy-intent-1");
    }

    #[test]
    fn second_toggle_flips_without_a_new_intent() {
        let mut h = harness();
        h.controller.toggle(false);
        h.pool.run_until_stalled();

        h.controller.toggle(true);
        h.pool.run_until_stalled();

        assert_eq!(h.intents.start_count(), 1);
        assert!(!h.controller.state().is_active);
        assert_eq!(h.toggles.get(), 2);
    }

    #[test]
    fn toggles_during_loading_are_ignored() {
        let mut h = harness();
        h.intents.defer_ready();

        h.controller.toggle(false);
        h.pool.run_until_stalled();
        h.controller.toggle(false);
        h.pool.run_until_stalled();

        assert_eq!(h.intents.start_count(), 1);
        assert!(h.controller.state().is_loading);
        assert_eq!(h.toggles.get(), 0);

        assert_eq!(h.intents.fire_ready(), 1);
        assert!(h.controller.state().is_active);
        assert_eq!(h.toggles.get(), 1);
    }

    #[test]
    fn closing_transition_removes_the_frame() {
        let mut h = harness();
        h.controller.toggle(false);
        h.pool.run_until_stalled();
        assert!(!h.controller.state().close_listener_armed);

        h.controller.transition_ended(TRANSFORM_PROPERTY);
        assert_eq!(h.intents.removed_frames(), 0);

        assert_eq!(h.intents.terminate(), 1);
        h.pool.run_until_stalled();
        assert!(h.controller.state().close_listener_armed);
        assert_eq!(h.toggles.get(), 2);

        h.controller.transition_ended("opacity");
        assert_eq!(h.intents.removed_frames(), 0);

        h.controller.transition_ended(TRANSFORM_PROPERTY);
        assert_eq!(h.intents.removed_frames(), 1);
        let state = h.controller.state();
        assert!(!state.is_active);
        assert_eq!(state.mount, IntentMount::Empty);
        assert_eq!(h.toggles.get(), 2);

        h.controller.transition_ended(TRANSFORM_PROPERTY);
        assert_eq!(h.intents.removed_frames(), 1);
        assert_eq!(h.toggles.get(), 2);
    }

    #[test]
    fn flipping_host_stays_in_sync_through_a_close() {
        let mut pool = LocalPool::new();
        let intents = MemoryIntentService::default();
        let host_opened = Rc::new(Cell::new(false));
        let controller = ClaudyController::new(
            Rc::new(intents.clone()),
            Rc::new(pool.spawner()),
            "mount",
            ClaudyHooks::default().on_toggle({
                let host_opened = host_opened.clone();
                move || host_opened.set(!host_opened.get())
            }),
        );

        controller.toggle(host_opened.get());
        pool.run_until_stalled();
        assert!(host_opened.get());
        assert!(controller.state().is_active);

        controller.toggle(host_opened.get());
        assert!(!host_opened.get());
        assert!(!controller.state().is_active);

        controller.toggle(host_opened.get());
        assert!(host_opened.get());
        assert!(controller.state().is_active);

        intents.terminate();
        pool.run_until_stalled();
        assert!(!host_opened.get());

        controller.transition_ended(TRANSFORM_PROPERTY);
        let state = controller.state();
        assert!(!host_opened.get());
        assert!(!state.is_active);
        assert_eq!(state.mount, IntentMount::Empty);
        assert_eq!(intents.removed_frames(), 1);

        controller.toggle(host_opened.get());
        pool.run_until_stalled();
        assert_eq!(intents.start_count(), 2);
        assert!(host_opened.get());
        assert!(controller.state().is_active);
        assert_eq!(controller.state().mount, IntentMount::Mounted);
    }

    #[test]
    fn failed_frame_removal_still_closes_the_widget() {
        let mut h = harness();
        h.intents.fail_frame_removal("frame already detached");
        h.controller.toggle(false);
        h.pool.run_until_stalled();
        h.intents.terminate();
        h.pool.run_until_stalled();

        h.controller.transition_ended(TRANSFORM_PROPERTY);

        let state = h.controller.state();
        assert_eq!(state.phase(), ClaudyPhase::Closed);
        assert_eq!(h.intents.removed_frames(), 0);
        assert!(h.errors.borrow().is_empty());
    }

    #[test]
    fn start_failure_returns_to_closed_and_reaches_the_host() {
        let intents = MemoryIntentService::default();
        intents.fail_with("cozy intents library is not loaded");
        let mut h = harness_with(intents);

        h.controller.toggle(false);
        h.pool.run_until_stalled();

        let state = h.controller.state();
        assert_eq!(state.phase(), ClaudyPhase::Closed);
        assert!(!state.is_loading);
        assert_eq!(
            *h.errors.borrow(),
            vec!["cozy intents library is not loaded".to_string()]
        );
        assert_eq!(h.toggles.get(), 0);
    }

    #[test]
    fn completions_after_unmount_are_dropped() {
        let mut h = harness();
        h.intents.defer_ready();
        h.controller.toggle(false);
        h.pool.run_until_stalled();

        h.controller.unmount();
        h.intents.fire_ready();
        h.controller.toggle(false);
        h.pool.run_until_stalled();

        assert!(h.controller.state().is_loading);
        assert_eq!(h.toggles.get(), 0);
        assert_eq!(h.intents.start_count(), 1);
    }

    #[test]
    fn change_hook_tracks_phases() {
        let mut pool = LocalPool::new();
        let intents = MemoryIntentService::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let controller = ClaudyController::new(
            Rc::new(intents),
            Rc::new(pool.spawner()),
            "mount",
            ClaudyHooks::default().on_change({
                let seen = seen.clone();
                move |state: &ClaudyState| {
                    let mut seen = seen.borrow_mut();
                    if seen.last() != Some(&state.phase()) {
                        seen.push(state.phase());
                    }
                }
            }),
        );

        controller.toggle(false);
        pool.run_until_stalled();
        controller.toggle(false);

        assert_eq!(
            *seen.borrow(),
            vec![
                ClaudyPhase::Loading,
                ClaudyPhase::ActiveFirstTime,
                ClaudyPhase::ActiveToggledClosed,
            ]
        );
    }
}
