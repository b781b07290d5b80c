//! Best-effort normalization of the configured stack location.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Canonical stack location derived from user configuration.
pub struct ResolvedUrl {
    /// `scheme://host[:port]`, without a trailing slash.
    pub base_url: String,
    /// Host with a non-default port, without scheme.
    pub host: String,
}

/// Derives the canonical base URL and host from `raw` and the `ssl` flag.
///
/// `raw` may be a full URL (mobile builds receive one) or a bare `host[:port]`. The scheme always
/// follows `ssl`, whatever `raw` carried. Inputs that do not parse as a URL with a host are used
/// verbatim as the host; this never fails.
pub fn resolve_base_url(raw: &str, ssl: bool) -> ResolvedUrl {
    let scheme = if ssl { "https" } else { "http" };
    let host = Url::parse(raw)
        .ok()
        .and_then(|url| {
            let host = url.host_str()?.to_string();
            Some(match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host,
            })
        })
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| raw.to_string());

    ResolvedUrl {
        base_url: format!("{scheme}://{host}"),
        host,
    }
}
