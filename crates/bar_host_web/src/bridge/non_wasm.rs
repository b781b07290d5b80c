use bar_host::{
    HttpRequest, HttpResponse, IntentHandle, IntentReadyCallback, IntentRequest,
    RealtimeEventStream,
};

use crate::page::BarDataset;

fn unsupported() -> String {
    "Browser APIs are only available when compiled for wasm32".to_string()
}

pub async fn fetch(_request: HttpRequest) -> Result<HttpResponse, String> {
    Err(unsupported())
}

pub async fn open_realtime(
    _socket_url: &str,
    _token: &str,
    _doctype: &str,
) -> Result<RealtimeEventStream, String> {
    Err(unsupported())
}

pub async fn start_intent(
    _request: &IntentRequest,
    _mount_id: &str,
    _on_ready: IntentReadyCallback,
) -> Result<IntentHandle, String> {
    Err(unsupported())
}

pub fn reload_page() -> Result<(), String> {
    Err(unsupported())
}

pub fn read_bar_dataset() -> Option<BarDataset> {
    None
}

pub fn page_is_secure() -> bool {
    false
}
