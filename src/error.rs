//! Error types shared across the crate.
//!
//! [`AdminError`] is the user-facing taxonomy every screen presents. The
//! boxed [`DynError`] plus [`Context`] helper cover setup paths (terminal,
//! log file) where only a message with context is needed.
use std::fmt::{Display, Formatter};

use thiserror::Error;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Generic message shown for transport failures.
pub const RETRY_LATER: &str = "Please try again later.";

/// Failure of a backend call, classified the way screens present it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// Missing credential, detected before any network call.
    #[error("API token is missing. Set BLUMDATE_API_TOKEN or pass --token.")]
    Configuration,
    /// Non-200 status, connection failure or undecodable body.
    #[error("failed to fetch {resource}: {detail}")]
    Transport { resource: String, detail: String },
    /// HTTP 404 on a collection endpoint.
    #[error("resource not found: the {resource} endpoint returned a 404 error")]
    NotFound { resource: String },
    /// HTTP 200 whose envelope status is not a success.
    #[error("{message}")]
    Application { message: String },
    /// A successful call that produced no records.
    #[error("{message}")]
    EmptyResult { message: String },
}

impl AdminError {
    pub fn transport(resource: &str, detail: impl Display) -> Self {
        Self::Transport {
            resource: resource.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Application error carrying the server message, or `fallback` when the
    /// server sent none.
    pub fn application(message: Option<String>, fallback: &str) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self::Application { message }
    }

    /// Text shown in the screen's error state.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { resource, .. } => {
                format!("Failed to fetch {resource}. {RETRY_LATER}")
            }
            Self::NotFound { resource } => {
                format!("Resource not found. The /{resource} endpoint returned a 404 error.")
            }
            other => other.to_string(),
        }
    }

    /// Empty results render as a neutral notice rather than an error banner.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}

pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

#[derive(Debug)]
pub struct WithContextError {
    pub context: String,
    pub source: DynError,
}

impl Display for WithContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for WithContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(WithContextError {
                context: f(),
                source: e.into(),
            }) as DynError
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_error_prefers_server_message() {
        let e = AdminError::application(Some("Token expired".into()), "Failed to fetch reports.");
        assert_eq!(e.user_message(), "Token expired");
        let e = AdminError::application(Some("   ".into()), "Failed to fetch reports.");
        assert_eq!(e.user_message(), "Failed to fetch reports.");
        let e = AdminError::application(None, "Failed to fetch reports.");
        assert_eq!(e.user_message(), "Failed to fetch reports.");
    }

    #[test]
    fn transport_error_hides_detail_from_user() {
        let e = AdminError::transport("reports", "connection refused");
        assert_eq!(e.user_message(), "Failed to fetch reports. Please try again later.");
        assert!(e.to_string().contains("connection refused"));
    }

    #[test]
    fn context_wraps_source_error() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = res.with_ctx(|| "open log file".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "open log file: gone");
    }
}
