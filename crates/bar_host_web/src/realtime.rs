//! Realtime adapter backed by a browser `WebSocket`.

use bar_host::{RealtimeConfig, RealtimeEventStream, RealtimeFuture, RealtimeService};

use crate::bridge;

/// WebSocket subprotocol spoken by the stack's realtime endpoint.
pub const REALTIME_SUBPROTOCOL: &str = "io.cozy.websocket";

/// Derives the realtime socket URL from the stack base URL.
///
/// `https://host` maps to `wss://host/realtime/`, anything else to `ws://host/realtime/`.
pub fn realtime_socket_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}/realtime/")
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}/realtime/")
    } else {
        format!("ws://{trimmed}/realtime/")
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser realtime service; one socket per subscription.
pub struct WebRealtimeService;

impl RealtimeService for WebRealtimeService {
    fn subscribe<'a>(
        &'a self,
        config: &'a RealtimeConfig,
        doctype: &'a str,
    ) -> RealtimeFuture<'a, Result<RealtimeEventStream, String>> {
        Box::pin(async move {
            bridge::open_realtime(&realtime_socket_url(&config.url), &config.token, doctype).await
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn socket_url_follows_base_url_scheme() {
        assert_eq!(
            realtime_socket_url("https://cozy.example"),
            "wss://cozy.example/realtime/"
        );
        assert_eq!(
            realtime_socket_url("http://cozy.tools:8080/"),
            "ws://cozy.tools:8080/realtime/"
        );
        assert_eq!(realtime_socket_url("cozy.local"), "ws://cozy.local/realtime/");
    }
}
