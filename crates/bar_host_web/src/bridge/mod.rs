//! Browser capability bridge for `bar_host_web` service adapters.
//!
//! This module routes calls to the `wasm32` implementation or to the non-wasm shim while keeping
//! one stable API for the adapters.

use bar_host::{
    HttpRequest, HttpResponse, IntentHandle, IntentReadyCallback, IntentRequest,
    RealtimeEventStream,
};

use crate::page::BarDataset;

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub async fn fetch(request: HttpRequest) -> Result<HttpResponse, String> {
    imp::fetch(request).await
}

pub async fn open_realtime(
    socket_url: &str,
    token: &str,
    doctype: &str,
) -> Result<RealtimeEventStream, String> {
    imp::open_realtime(socket_url, token, doctype).await
}

pub async fn start_intent(
    request: &IntentRequest,
    mount_id: &str,
    on_ready: IntentReadyCallback,
) -> Result<IntentHandle, String> {
    imp::start_intent(request, mount_id, on_ready).await
}

pub fn reload_page() -> Result<(), String> {
    imp::reload_page()
}

pub fn read_bar_dataset() -> Option<BarDataset> {
    imp::read_bar_dataset()
}

pub fn page_is_secure() -> bool {
    imp::page_is_secure()
}
