//! Error types for the web client.

use thiserror::Error;

/// Errors that can occur while fetching a document.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (timeout, connection reset, DNS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The cache backend failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The retry budget was exhausted; carries one message per attempt.
    #[error("Retries exhausted after {attempts} attempts: [{}]", errors.join("; "))]
    RetriesExhausted {
        attempts: usize,
        errors: Vec<String>,
    },
}

impl FetchError {
    /// Create an invalid URL error.
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Whether retrying this error could succeed.
    ///
    /// Transport failures, 5xx responses, and 429 are transient; any
    /// other status and malformed URLs are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidUrl(_) | Self::Cache(_) | Self::RetriesExhausted { .. } => false,
        }
    }
}
