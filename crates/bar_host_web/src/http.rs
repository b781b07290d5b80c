//! HTTP transport adapter backed by the browser `fetch` API.

use bar_host::{HttpFuture, HttpRequest, HttpResponse, HttpTransport};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Browser HTTP transport backed by `window.fetch`.
pub struct WebHttpTransport;

impl HttpTransport for WebHttpTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a, Result<HttpResponse, String>> {
        Box::pin(async move { bridge::fetch(request).await })
    }
}
