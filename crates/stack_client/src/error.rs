//! Typed failure kinds surfaced by the stack client.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors returned by [`crate::Stack`] operations.
pub enum StackError {
    /// The stack answered 401.
    #[error("unauthorized: the stack rejected the access token")]
    Unauthorized,
    /// The stack answered 403.
    #[error("forbidden")]
    Forbidden,
    /// The stack answered 404.
    #[error("not found")]
    NotFound,
    /// The stack answered 405.
    #[error("method not allowed")]
    MethodNotAllowed,
    /// The stack answered 500.
    #[error("stack server error")]
    ServerError,
    /// The stack could not be reached or answered unusably.
    #[error("stack unavailable")]
    StackUnavailable,
    /// The settings app is not installed or exposes no URL.
    #[error("settings app unavailable")]
    SettingsUnavailable,
    /// An app lookup was requested without a slug.
    #[error("Missing slug")]
    MissingSlug,
    /// An operation needing a session ran before `init`.
    #[error("stack client used before init")]
    NotInitialized,
    /// The response body carried an `error` field.
    #[error("{0}")]
    Server(String),
    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),
    /// The response body could not be decoded into the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// A realtime create event could not be hydrated into a full app record.
    #[error("Cannot fetch app {slug}: {reason}")]
    AppHydration {
        /// Slug carried by the realtime event.
        slug: String,
        /// Display form of the underlying failure.
        reason: String,
    },
}

impl StackError {
    /// Maps an HTTP status to the error kind that short-circuits decoding, if any.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            405 => Some(Self::MethodNotAllowed),
            500 => Some(Self::ServerError),
            _ => None,
        }
    }

    /// Returns the HTTP status this error was derived from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::MethodNotAllowed => Some(405),
            Self::ServerError => Some(500),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table_is_exhaustive_and_reversible() {
        let table = [
            (401, StackError::Unauthorized),
            (403, StackError::Forbidden),
            (404, StackError::NotFound),
            (405, StackError::MethodNotAllowed),
            (500, StackError::ServerError),
        ];
        for (status, expected) in &table {
            let error = StackError::from_status(*status).expect("mapped status");
            assert_eq!(&error, expected);
            assert_eq!(error.status(), Some(*status));
        }

        for status in (100..600).filter(|status| !table.iter().any(|(s, _)| s == status)) {
            assert_eq!(StackError::from_status(status), None, "status {status}");
        }
    }

    #[test]
    fn hydration_error_names_the_app() {
        let error = StackError::AppHydration {
            slug: "drive".to_string(),
            reason: StackError::NotFound.to_string(),
        };
        assert_eq!(error.to_string(), "Cannot fetch app drive: not found");
    }
}
