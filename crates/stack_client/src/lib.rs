//! Client-side façade over the stack's REST and realtime APIs.
//!
//! [`Stack`] owns the session for one bar instance and exposes typed accessors for apps, storage
//! usage, the deployment context, icons and the settings URL. Transport, realtime and page
//! side effects go through the [`bar_host::BarHostServices`] bundle it is built with.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod apps;
pub mod base_url;
pub mod context_memo;
pub mod error;
pub mod provider;
pub mod realtime;
pub mod request;
pub mod session;
pub mod stack;

pub use apps::{AppIcon, AppLinks, AppRecord, IconProps, StorageUsage, DEFAULT_QUOTA};
pub use base_url::{resolve_base_url, ResolvedUrl};
pub use context_memo::{ContextMemo, MemoState};
pub use error::StackError;
pub use provider::{provide_stack, use_stack};
pub use realtime::{AppEventHandlers, APPS_DOCTYPE};
pub use request::RequestBody;
pub use session::{Session, StackConfig};
pub use stack::{Stack, StackGetters};
