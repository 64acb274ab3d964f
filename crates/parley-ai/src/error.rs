//! Error types for parley-ai

use thiserror::Error;

/// Result type alias using parley-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to a generation backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Backend answered 2xx with an explicit `error` field
    #[error("Backend error: {0}")]
    Backend(String),

    /// Body parsed but carried neither a response nor an error
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A name did not match any known variant (tone, platform, tag, ...)
    #[error("Unknown {what}: '{value}'")]
    UnknownVariant { what: &'static str, value: String },
}

impl Error {
    /// Create a status error from a code and message
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn unknown(what: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            what,
            value: value.into(),
        }
    }

    /// Whether the backend itself reported the failure (as opposed to the
    /// request never completing).
    pub fn is_backend_reported(&self) -> bool {
        matches!(self, Error::Status { .. } | Error::Backend(_))
    }
}
