//! Typed host-domain contracts shared by the stack client, the Claudy widget and browser adapters.
//!
//! This crate is the API-first boundary between bar logic and the environment it runs in. It
//! exposes the HTTP transport, realtime subscription, intent-loading and page services as
//! object-safe traits, with in-memory adapters for tests. Concrete browser adapters live in
//! `bar_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod http;
pub mod intent;
pub mod page;
pub mod realtime;

pub use host::{BarHostServices, BarTarget};
pub use http::{
    HttpFuture, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MemoryHttpTransport,
    NoopHttpTransport,
};
pub use intent::{
    IntentFuture, IntentHandle, IntentReadyCallback, IntentRequest, IntentService,
    MemoryIntentService, NoopIntentService, CLAUDY_INTENT_ACTION, CLAUDY_INTENT_DOCTYPE,
};
pub use page::{MemoryPageService, NoopPageService, PageService};
pub use realtime::{
    auth_frame, subscribe_frame, MemoryRealtimeService, NoopRealtimeService, RealtimeConfig,
    RealtimeEvent, RealtimeEventKind, RealtimeEventStream, RealtimeFuture, RealtimeService,
};
