//! Realtime subscription contracts, wire-frame helpers and an in-memory adapter.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use futures::{
    channel::mpsc::{self, UnboundedSender},
    stream::LocalBoxStream,
    StreamExt,
};
use serde_json::{json, Value};

/// Object-safe boxed future used by [`RealtimeService`].
pub type RealtimeFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Stream of events delivered by one subscription. It ends when the channel closes.
pub type RealtimeEventStream = LocalBoxStream<'static, RealtimeEvent>;

#[derive(Clone, PartialEq, Eq)]
/// Credentials and endpoint used to open a realtime subscription.
pub struct RealtimeConfig {
    /// Bearer token presented on the channel.
    pub token: String,
    /// Canonical stack base URL (`http(s)://host`).
    pub url: String,
}

impl std::fmt::Debug for RealtimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeConfig")
            .field("token", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Document lifecycle event kinds published by the stack.
pub enum RealtimeEventKind {
    /// A document was created.
    Created,
    /// A document was updated.
    Updated,
    /// A document was deleted.
    Deleted,
}

impl RealtimeEventKind {
    /// Parses the stack's wire token (`CREATED`, `UPDATED`, `DELETED`).
    pub fn from_wire(token: &str) -> Option<Self> {
        match token {
            "CREATED" => Some(Self::Created),
            "UPDATED" => Some(Self::Updated),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One document event received on a realtime subscription.
pub struct RealtimeEvent {
    /// Lifecycle event kind.
    pub kind: RealtimeEventKind,
    /// Doctype of the affected document (for example `io.cozy.apps`).
    pub doctype: String,
    /// Document id.
    pub id: String,
    /// Partial document payload carried by the event.
    pub doc: Value,
}

impl RealtimeEvent {
    /// Parses a `{"event": ..., "payload": {"type", "id", "doc"}}` frame.
    ///
    /// Returns `None` for frames that are not document events (auth acks, errors, unknown
    /// event names).
    pub fn from_wire(frame: &Value) -> Option<Self> {
        let kind = RealtimeEventKind::from_wire(frame.get("event")?.as_str()?)?;
        let payload = frame.get("payload")?;
        let doctype = payload.get("type")?.as_str()?.to_string();
        let doc = payload.get("doc").cloned().unwrap_or(Value::Null);
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .or_else(|| doc.get("_id").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();
        Some(Self {
            kind,
            doctype,
            id,
            doc,
        })
    }
}

/// Builds the authentication frame sent when a realtime socket opens.
pub fn auth_frame(token: &str) -> Value {
    json!({ "method": "AUTH", "payload": token })
}

/// Builds the subscription frame for every document of `doctype`.
pub fn subscribe_frame(doctype: &str) -> Value {
    json!({ "method": "SUBSCRIBE", "payload": { "type": doctype } })
}

/// Host service opening push subscriptions on the stack's realtime channel.
pub trait RealtimeService {
    /// Subscribes to every document event of `doctype`.
    ///
    /// Resolves once the subscription is established; events are then delivered on the returned
    /// stream.
    fn subscribe<'a>(
        &'a self,
        config: &'a RealtimeConfig,
        doctype: &'a str,
    ) -> RealtimeFuture<'a, Result<RealtimeEventStream, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Realtime service for targets without a realtime channel. Every subscription fails.
pub struct NoopRealtimeService;

impl RealtimeService for NoopRealtimeService {
    fn subscribe<'a>(
        &'a self,
        _config: &'a RealtimeConfig,
        _doctype: &'a str,
    ) -> RealtimeFuture<'a, Result<RealtimeEventStream, String>> {
        Box::pin(async { Err("realtime channel unavailable".to_string()) })
    }
}

#[derive(Debug, Default)]
struct MemoryRealtimeState {
    failure: Option<String>,
    subscriptions: Vec<(RealtimeConfig, String)>,
    senders: Vec<(String, UnboundedSender<RealtimeEvent>)>,
}

#[derive(Debug, Clone, Default)]
/// In-memory realtime service whose events are pushed by the caller.
pub struct MemoryRealtimeService {
    inner: Rc<RefCell<MemoryRealtimeState>>,
}

impl MemoryRealtimeService {
    /// Makes every later subscription attempt fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.inner.borrow_mut().failure = Some(message.into());
    }

    /// Delivers `event` to every open subscription for its doctype and returns the delivery count.
    pub fn emit(&self, event: RealtimeEvent) -> usize {
        let state = self.inner.borrow();
        state
            .senders
            .iter()
            .filter(|(doctype, _)| *doctype == event.doctype)
            .filter(|(_, sender)| sender.unbounded_send(event.clone()).is_ok())
            .count()
    }

    /// Closes every open subscription stream.
    pub fn close_all(&self) {
        self.inner.borrow_mut().senders.clear();
    }

    /// Returns the successful subscription requests seen so far.
    pub fn subscriptions(&self) -> Vec<(RealtimeConfig, String)> {
        self.inner.borrow().subscriptions.clone()
    }
}

impl RealtimeService for MemoryRealtimeService {
    fn subscribe<'a>(
        &'a self,
        config: &'a RealtimeConfig,
        doctype: &'a str,
    ) -> RealtimeFuture<'a, Result<RealtimeEventStream, String>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            if let Some(message) = state.failure.clone() {
                return Err(message);
            }
            let (sender, receiver) = mpsc::unbounded();
            state
                .subscriptions
                .push((config.clone(), doctype.to_string()));
            state.senders.push((doctype.to_string(), sender));
            Ok(receiver.boxed_local())
        })
    }
}
