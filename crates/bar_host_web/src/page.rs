//! Hosting-page adapter and page-level configuration readers.

use bar_host::PageService;

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Browser page service backed by `window.location`.
pub struct WebPageService;

impl PageService for WebPageService {
    fn reload(&self) -> Result<(), String> {
        bridge::reload_page()
    }
}

#[derive(Clone, PartialEq, Eq)]
/// Bar configuration published by the hosting page on its `[role=application]` element.
pub struct BarDataset {
    /// `data-cozy-domain`: stack domain, with or without protocol.
    pub cozy_domain: String,
    /// `data-cozy-token`: app access token.
    pub cozy_token: String,
}

impl std::fmt::Debug for BarDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarDataset")
            .field("cozy_domain", &self.cozy_domain)
            .field("cozy_token", &"<redacted>")
            .finish()
    }
}

/// Reads the bar configuration from the hosting page, if present.
pub fn read_bar_dataset() -> Option<BarDataset> {
    bridge::read_bar_dataset()
}

/// Returns whether the hosting page was served over HTTPS.
pub fn page_is_secure() -> bool {
    bridge::page_is_secure()
}
