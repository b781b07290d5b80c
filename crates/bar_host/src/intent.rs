//! Intent-loading contracts and an in-memory adapter.
//!
//! An intent is a third-party mini-application mounted as an iframe inside a DOM region owned by
//! the caller. The region is addressed by its DOM id so this crate stays free of browser types.

use std::{cell::RefCell, fmt, future::Future, pin::Pin, rc::Rc};

use futures::channel::oneshot;

/// Object-safe boxed future used by [`IntentService`].
pub type IntentFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Callback invoked once the intent frame reports it is ready.
pub type IntentReadyCallback = Box<dyn FnOnce()>;

/// Intent action opened by the Claudy widget.
pub const CLAUDY_INTENT_ACTION: &str = "CLAUDY";
/// Doctype the Claudy intent is registered for.
pub const CLAUDY_INTENT_DOCTYPE: &str = "io.cozy.settings";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Intent creation parameters.
pub struct IntentRequest {
    /// Intent action name.
    pub action: String,
    /// Target doctype.
    pub doctype: String,
    /// Whether the intent exposes a frame-removal handle to the caller.
    pub expose_frame_removal: bool,
}

impl IntentRequest {
    /// Request for the Claudy help intent.
    pub fn claudy() -> Self {
        Self {
            action: CLAUDY_INTENT_ACTION.to_string(),
            doctype: CLAUDY_INTENT_DOCTYPE.to_string(),
            expose_frame_removal: true,
        }
    }
}

type RemoveFrame = Rc<dyn Fn() -> Result<(), String>>;

#[derive(Clone)]
/// Handle delivered when an intent terminates.
pub struct IntentHandle {
    remove_frame: RemoveFrame,
}

impl IntentHandle {
    /// Wraps the host's frame-removal function.
    pub fn new(remove_frame: impl Fn() -> Result<(), String> + 'static) -> Self {
        Self {
            remove_frame: Rc::new(remove_frame),
        }
    }

    /// Removes the intent iframe from its mount region.
    ///
    /// # Errors
    ///
    /// Returns the host's failure message when the frame could not be removed.
    pub fn remove_intent_frame(&self) -> Result<(), String> {
        (self.remove_frame)()
    }
}

impl fmt::Debug for IntentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentHandle").finish_non_exhaustive()
    }
}

/// Host capability that mounts intents into a DOM region.
pub trait IntentService {
    /// Starts `request` inside the element with id `mount_id`.
    ///
    /// `on_ready` is invoked at most once, when the intent frame is ready. The returned future
    /// resolves with the frame-removal handle once the intent terminates, or with an error when
    /// the intent cannot be started.
    fn start<'a>(
        &'a self,
        request: &'a IntentRequest,
        mount_id: &'a str,
        on_ready: IntentReadyCallback,
    ) -> IntentFuture<'a, Result<IntentHandle, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Intent service for targets without the intents library.
pub struct NoopIntentService;

impl IntentService for NoopIntentService {
    fn start<'a>(
        &'a self,
        _request: &'a IntentRequest,
        _mount_id: &'a str,
        _on_ready: IntentReadyCallback,
    ) -> IntentFuture<'a, Result<IntentHandle, String>> {
        Box::pin(async { Err("intent service unavailable".to_string()) })
    }
}

#[derive(Default)]
struct MemoryIntentState {
    failure: Option<String>,
    defer_ready: bool,
    pending_ready: Vec<IntentReadyCallback>,
    running: Vec<oneshot::Sender<()>>,
    starts: Vec<(IntentRequest, String)>,
    removed_frames: usize,
    removal_failure: Option<String>,
}

#[derive(Clone, Default)]
/// In-memory intent service recording starts and frame removals.
///
/// By default the ready callback fires as soon as the intent starts. Start futures stay pending
/// until [`Self::terminate`] ends the running intents.
pub struct MemoryIntentService {
    inner: Rc<RefCell<MemoryIntentState>>,
}

impl fmt::Debug for MemoryIntentService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("MemoryIntentService")
            .field("starts", &state.starts)
            .field("removed_frames", &state.removed_frames)
            .finish_non_exhaustive()
    }
}

impl MemoryIntentService {
    /// Makes every later start fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.inner.borrow_mut().failure = Some(message.into());
    }

    /// Holds ready callbacks until [`Self::fire_ready`] is called.
    pub fn defer_ready(&self) {
        self.inner.borrow_mut().defer_ready = true;
    }

    /// Fires every held ready callback and returns how many fired.
    pub fn fire_ready(&self) -> usize {
        let pending = std::mem::take(&mut self.inner.borrow_mut().pending_ready);
        let count = pending.len();
        for on_ready in pending {
            on_ready();
        }
        count
    }

    /// Terminates every running intent and returns how many were running.
    pub fn terminate(&self) -> usize {
        let running = std::mem::take(&mut self.inner.borrow_mut().running);
        running
            .into_iter()
            .filter_map(|terminated| terminated.send(()).ok())
            .count()
    }

    /// Makes later frame removals fail with `message`.
    pub fn fail_frame_removal(&self, message: impl Into<String>) {
        self.inner.borrow_mut().removal_failure = Some(message.into());
    }

    /// Number of intents started so far.
    pub fn start_count(&self) -> usize {
        self.inner.borrow().starts.len()
    }

    /// Started requests with their mount ids, oldest first.
    pub fn starts(&self) -> Vec<(IntentRequest, String)> {
        self.inner.borrow().starts.clone()
    }

    /// Number of frame removals requested through returned handles.
    pub fn removed_frames(&self) -> usize {
        self.inner.borrow().removed_frames
    }
}

impl IntentService for MemoryIntentService {
    fn start<'a>(
        &'a self,
        request: &'a IntentRequest,
        mount_id: &'a str,
        on_ready: IntentReadyCallback,
    ) -> IntentFuture<'a, Result<IntentHandle, String>> {
        Box::pin(async move {
            let (terminated_tx, terminated_rx) = oneshot::channel();
            let ready_now = {
                let mut state = self.inner.borrow_mut();
                state.starts.push((request.clone(), mount_id.to_string()));
                if let Some(message) = state.failure.clone() {
                    return Err(message);
                }
                state.running.push(terminated_tx);
                if state.defer_ready {
                    state.pending_ready.push(on_ready);
                    None
                } else {
                    Some(on_ready)
                }
            };
            if let Some(on_ready) = ready_now {
                on_ready();
            }

            terminated_rx
                .await
                .map_err(|_| "intent service dropped the running intent".to_string())?;
            let inner = self.inner.clone();
            Ok(IntentHandle::new(move || {
                let mut state = inner.borrow_mut();
                if let Some(message) = state.removal_failure.clone() {
                    return Err(message);
                }
                state.removed_frames += 1;
                Ok(())
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::{
        executor::{block_on, LocalPool},
        task::LocalSpawnExt,
    };

    use super::*;

    type Outcome = Rc<RefCell<Option<Result<IntentHandle, String>>>>;

    fn spawn_start(
        pool: &LocalPool,
        service: &MemoryIntentService,
        mount_id: &'static str,
        on_ready: IntentReadyCallback,
    ) -> Outcome {
        let outcome: Outcome = Rc::new(RefCell::new(None));
        let slot = outcome.clone();
        let service = service.clone();
        pool.spawner()
            .spawn_local(async move {
                let request = IntentRequest::claudy();
                let result = service.start(&request, mount_id, on_ready).await;
                slot.replace(Some(result));
            })
            .expect("spawn start");
        outcome
    }

    #[test]
    fn memory_service_resolves_only_on_terminate() {
        let mut pool = LocalPool::new();
        let service = MemoryIntentService::default();
        let ready = Rc::new(Cell::new(false));
        let ready_flag = ready.clone();

        let outcome = spawn_start(
            &pool,
            &service,
            "claudy-intent-1",
            Box::new(move || ready_flag.set(true)),
        );
        pool.run_until_stalled();

        assert!(ready.get());
        assert!(outcome.borrow().is_none());
        assert_eq!(service.starts()[0].1, "claudy-intent-1");

        assert_eq!(service.terminate(), 1);
        pool.run_until_stalled();

        let handle = outcome
            .borrow_mut()
            .take()
            .expect("resolved")
            .expect("terminated intent");
        assert_eq!(handle.remove_intent_frame(), Ok(()));
        assert_eq!(service.removed_frames(), 1);
        assert_eq!(service.terminate(), 0);
    }

    #[test]
    fn frame_removal_failures_reach_the_caller() {
        let mut pool = LocalPool::new();
        let service = MemoryIntentService::default();
        service.fail_frame_removal("frame already detached");

        let outcome = spawn_start(&pool, &service, "mount", Box::new(|| {}));
        pool.run_until_stalled();
        assert_eq!(service.terminate(), 1);
        pool.run_until_stalled();

        let handle = outcome
            .borrow_mut()
            .take()
            .expect("resolved")
            .expect("terminated intent");
        assert_eq!(
            handle.remove_intent_frame(),
            Err("frame already detached".to_string())
        );
        assert_eq!(service.removed_frames(), 0);
    }

    #[test]
    fn deferred_ready_waits_for_fire() {
        let mut pool = LocalPool::new();
        let service = MemoryIntentService::default();
        service.defer_ready();
        let ready = Rc::new(Cell::new(0));
        let ready_count = ready.clone();

        spawn_start(
            &pool,
            &service,
            "mount",
            Box::new(move || ready_count.set(ready_count.get() + 1)),
        );
        pool.run_until_stalled();

        assert_eq!(ready.get(), 0);
        assert_eq!(service.fire_ready(), 1);
        assert_eq!(service.fire_ready(), 0);
        assert_eq!(ready.get(), 1);
    }

    #[test]
    fn failing_service_never_fires_ready() {
        let service = MemoryIntentService::default();
        service.fail_with("intents library missing");
        let request = IntentRequest::claudy();
        let ready = Rc::new(Cell::new(false));
        let ready_flag = ready.clone();

        let err = block_on(service.start(
            &request,
            "mount",
            Box::new(move || ready_flag.set(true)),
        ))
        .expect_err("start should fail");

        assert_eq!(err, "intents library missing");
        assert!(!ready.get());
        assert_eq!(service.start_count(), 1);
    }

    #[test]
    fn claudy_request_targets_settings_doctype() {
        let request = IntentRequest::claudy();
        assert_eq!(request.action, "CLAUDY");
        assert_eq!(request.doctype, "io.cozy.settings");
        assert!(request.expose_frame_removal);
    }
}
