//! Shared host-bundle and target models for browser and mobile bar composition.

use std::rc::Rc;

use futures::task::LocalSpawn;

use crate::{HttpTransport, IntentService, PageService, RealtimeService};

/// Runtime target the bar was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarTarget {
    /// Bar embedded in a web app served by the stack itself.
    #[default]
    Browser,
    /// Bar embedded in a mobile app that talks to a remote stack.
    Mobile,
}

impl BarTarget {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Mobile => "mobile",
        }
    }
}

/// Host service bundle injected into the stack client and the widgets.
///
/// Environment-specific selection happens before this bundle is built, which keeps
/// `stack_client` and `claudy` free of browser adapter details.
#[derive(Clone)]
pub struct BarHostServices {
    /// HTTP transport used for every stack request.
    pub http: Rc<dyn HttpTransport>,
    /// Realtime subscription service.
    pub realtime: Rc<dyn RealtimeService>,
    /// Intent-loading capability.
    pub intents: Rc<dyn IntentService>,
    /// Hosting-page service.
    pub page: Rc<dyn PageService>,
    /// Executor for detached local tasks (realtime pumps, intent starts).
    pub spawner: Rc<dyn LocalSpawn>,
    /// Target the bar was built for.
    pub target: BarTarget,
}
