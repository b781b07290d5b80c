//! HTTP transport contracts and lightweight test adapters.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    fmt,
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde_json::Value;

/// Object-safe boxed future used by [`HttpTransport`].
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// HTTP verbs issued by the bar.
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Returns the wire token for the verb.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Returns whether a request body may be attached to this verb.
    pub const fn allows_body(self) -> bool {
        !matches!(self, Self::Get | Self::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Transport-neutral HTTP request description.
pub struct HttpRequest {
    /// Request verb.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Header list in insertion order. Names are compared case-insensitively.
    pub headers: Vec<(String, String)>,
    /// Optional serialized request body.
    pub body: Option<String>,
    /// Whether cookies are sent, including on cross-origin requests.
    pub include_credentials: bool,
}

impl HttpRequest {
    /// Creates a request without headers, body or credentials.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            include_credentials: false,
        }
    }

    /// Reads a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Sets a header, replacing any existing value with the same case-insensitive name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Raw HTTP response returned by a transport.
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers the transport chose to surface.
    pub headers: Vec<(String, String)>,
    /// Undecoded response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with the given status and raw body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Creates a JSON response with the given status.
    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string()).with_header("content-type", "application/json")
    }

    /// Creates a bodiless response with the given status.
    pub fn empty(status: u16) -> Self {
        Self::new(status, Vec::new())
    }

    /// Returns the response with an extra header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Reads a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Host service issuing HTTP requests.
///
/// `Err` is reserved for transport-level failures (network down, CORS rejection, aborted
/// request). Any response that reached the client, whatever its status, is `Ok`.
pub trait HttpTransport {
    /// Sends one request and resolves with the raw response.
    fn send<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a, Result<HttpResponse, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// HTTP transport for targets without network access. Every request fails.
pub struct NoopHttpTransport;

impl HttpTransport for NoopHttpTransport {
    fn send<'a>(&'a self, _request: HttpRequest) -> HttpFuture<'a, Result<HttpResponse, String>> {
        Box::pin(async { Err("http transport unavailable".to_string()) })
    }
}

type RouteKey = (HttpMethod, String);

#[derive(Debug, Default)]
struct MemoryHttpState {
    routes: HashMap<RouteKey, VecDeque<Result<HttpResponse, String>>>,
    sent: Vec<HttpRequest>,
}

#[derive(Debug, Clone, Default)]
/// Scripted in-memory transport keyed by `(method, url)`.
///
/// Scripted outcomes for a route are consumed in order; the last one stays in place and answers
/// every later request to that route. Unscripted routes fail like a network error.
pub struct MemoryHttpTransport {
    inner: Rc<RefCell<MemoryHttpState>>,
}

impl MemoryHttpTransport {
    /// Scripts a response for `method url`.
    pub fn respond(&self, method: HttpMethod, url: impl Into<String>, response: HttpResponse) {
        self.push(method, url.into(), Ok(response));
    }

    /// Scripts a JSON response for `method url`.
    pub fn respond_json(&self, method: HttpMethod, url: impl Into<String>, status: u16, body: Value) {
        self.respond(method, url, HttpResponse::json(status, &body));
    }

    /// Scripts a transport failure for `method url`.
    pub fn fail(&self, method: HttpMethod, url: impl Into<String>, message: impl Into<String>) {
        self.push(method, url.into(), Err(message.into()));
    }

    /// Returns every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.borrow().sent.clone()
    }

    /// Counts requests sent to `method url`.
    pub fn request_count(&self, method: HttpMethod, url: &str) -> usize {
        self.inner
            .borrow()
            .sent
            .iter()
            .filter(|request| request.method == method && request.url == url)
            .count()
    }

    fn push(&self, method: HttpMethod, url: String, outcome: Result<HttpResponse, String>) {
        self.inner
            .borrow_mut()
            .routes
            .entry((method, url))
            .or_default()
            .push_back(outcome);
    }

    fn next_outcome(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
        let mut state = self.inner.borrow_mut();
        state.sent.push(request.clone());
        let key = (request.method, request.url.clone());
        let Some(queue) = state.routes.get_mut(&key) else {
            return Err(format!(
                "no scripted response for {} {}",
                request.method, request.url
            ));
        };
        if queue.len() > 1 {
            queue
                .pop_front()
                .unwrap_or_else(|| Err("scripted response queue drained".to_string()))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err("scripted response queue drained".to_string()))
        }
    }
}

impl HttpTransport for MemoryHttpTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a, Result<HttpResponse, String>> {
        Box::pin(async move { self.next_outcome(&request) })
    }
}
