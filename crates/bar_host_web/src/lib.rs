//! Browser (`wasm32`) implementations of [`bar_host`] service contracts.
//!
//! This crate is the concrete browser-side wiring layer for the HTTP transport, realtime channel,
//! intents library, page services and local task spawning.
//!
//! Browser bindings live under `bridge/`, split into a `wasm32` implementation and a non-wasm
//! fallback shim so native builds and tests compile against the same API.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time target selection and concrete adapter factories for runtime wiring.
pub mod adapters;
mod bridge;
pub mod http;
pub mod intent;
pub mod page;
pub mod realtime;
pub mod spawn;

pub use adapters::{
    bar_target_name, build_host_services, http_transport, intent_service, local_spawner,
    page_service, realtime_service, selected_bar_target,
};
pub use http::WebHttpTransport;
pub use intent::WebIntentService;
pub use page::{page_is_secure, read_bar_dataset, BarDataset, WebPageService};
pub use realtime::{realtime_socket_url, WebRealtimeService, REALTIME_SUBPROTOCOL};
pub use spawn::WebLocalSpawner;
