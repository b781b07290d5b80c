//! Bar configuration and the per-instance session snapshot.

use serde::{Deserialize, Serialize};

use crate::base_url::resolve_base_url;

fn default_ssl() -> bool {
    true
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Configuration accepted by [`crate::Stack::init`].
pub struct StackConfig {
    /// Stack location, either a bare `host[:port]` or a full URL.
    #[serde(alias = "cozyURL")]
    pub cozy_url: String,
    /// App access token.
    pub token: String,
    /// Whether the stack is reached over HTTPS.
    #[serde(default = "default_ssl")]
    pub ssl: bool,
}

impl StackConfig {
    /// Creates an HTTPS configuration.
    pub fn new(cozy_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            cozy_url: cozy_url.into(),
            token: token.into(),
            ssl: default_ssl(),
        }
    }

    /// Returns the configuration with the given SSL flag.
    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }
}

impl std::fmt::Debug for StackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackConfig")
            .field("cozy_url", &self.cozy_url)
            .field("token", &"<redacted>")
            .field("ssl", &self.ssl)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
/// Immutable session snapshot. Token refreshes replace the whole snapshot.
pub struct Session {
    /// Canonical `scheme://host[:port]`.
    pub base_url: String,
    /// Host without scheme.
    pub host: String,
    /// Bearer token sent with every request.
    pub token: String,
    /// Whether the stack is reached over HTTPS.
    pub use_ssl: bool,
}

impl Session {
    /// Builds the session described by `config`.
    pub fn from_config(config: &StackConfig) -> Self {
        let resolved = resolve_base_url(&config.cozy_url, config.ssl);
        Self {
            base_url: resolved.base_url,
            host: resolved.host,
            token: config.token.clone(),
            use_ssl: config.ssl,
        }
    }

    /// Returns a copy of the session carrying `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..self.clone()
        }
    }

    /// Joins an absolute stack path (`/apps/`) onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("use_ssl", &self.use_ssl)
            .finish()
    }
}
