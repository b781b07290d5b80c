//! Intents adapter backed by the page's cozy intents library.

use bar_host::{IntentFuture, IntentHandle, IntentReadyCallback, IntentRequest, IntentService};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Browser intent service delegating to `cozy.client.intents`.
pub struct WebIntentService;

impl IntentService for WebIntentService {
    fn start<'a>(
        &'a self,
        request: &'a IntentRequest,
        mount_id: &'a str,
        on_ready: IntentReadyCallback,
    ) -> IntentFuture<'a, Result<IntentHandle, String>> {
        Box::pin(async move { bridge::start_intent(request, mount_id, on_ready).await })
    }
}
