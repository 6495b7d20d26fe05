//! Error types for backend adapters

use pawchive_model::{ModelError, StrayId};

/// Backend operation errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Network or connection failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend answered with an error status
    #[error("backend returned {status}: {message}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Message from the error body, or the raw body
        message: String,
    },

    /// Response body did not decode
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// No record with this id
    #[error("stray not found: {0}")]
    NotFound(StrayId),

    /// Draft failed validation
    #[error("invalid record: {0}")]
    Invalid(#[from] ModelError),

    /// Backend refused service (in-memory fault injection)
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Create backend status error
    #[inline]
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Check if the failure came from the network rather than the data
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Unavailable(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::backend(status.as_u16(), err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
