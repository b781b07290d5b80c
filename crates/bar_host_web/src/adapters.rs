use std::rc::Rc;

use bar_host::{BarHostServices, BarTarget};

use crate::{
    WebHttpTransport, WebIntentService, WebLocalSpawner, WebPageService, WebRealtimeService,
};

/// Returns the compile-time selected bar target for the active build.
pub const fn selected_bar_target() -> BarTarget {
    #[cfg(feature = "mobile")]
    {
        BarTarget::Mobile
    }

    #[cfg(not(feature = "mobile"))]
    {
        BarTarget::Browser
    }
}

/// Returns the selected bar target as a stable string token.
pub fn bar_target_name() -> &'static str {
    selected_bar_target().as_str()
}

/// Builds the HTTP transport for the active build.
pub fn http_transport() -> WebHttpTransport {
    WebHttpTransport
}

/// Builds the realtime service for the active build.
pub fn realtime_service() -> WebRealtimeService {
    WebRealtimeService
}

/// Builds the intents service for the active build.
pub fn intent_service() -> WebIntentService {
    WebIntentService
}

/// Builds the hosting-page service for the active build.
pub fn page_service() -> WebPageService {
    WebPageService
}

/// Builds the local task spawner for the active build.
pub fn local_spawner() -> WebLocalSpawner {
    WebLocalSpawner
}

/// Builds the complete browser host bundle consumed by the stack client and widgets.
pub fn build_host_services() -> BarHostServices {
    BarHostServices {
        http: Rc::new(http_transport()),
        realtime: Rc::new(realtime_service()),
        intents: Rc::new(intent_service()),
        page: Rc::new(page_service()),
        spawner: Rc::new(local_spawner()),
        target: selected_bar_target(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_name_matches_selected_target() {
        assert_eq!(bar_target_name(), selected_bar_target().as_str());
        #[cfg(not(feature = "mobile"))]
        assert_eq!(selected_bar_target(), BarTarget::Browser);
        #[cfg(feature = "mobile")]
        assert_eq!(selected_bar_target(), BarTarget::Mobile);
    }

    #[test]
    fn host_bundle_carries_selected_target() {
        let services = build_host_services();
        assert_eq!(services.target, selected_bar_target());
    }
}
