//! Error types for the ingest pipeline.

use thiserror::Error;

use dramatis_client::FetchError;
use dramatis_resolver::ResolverError;

/// Errors that can occur during an ingest run.
#[derive(Debug, Clone, Error)]
pub enum IngestError {
    /// Error from the HTTP layer.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from a source adapter.
    #[error("Source error: {0}")]
    Source(String),

    /// Error from the record sink.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Error building the resolver.
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// A work item panicked; recorded as that item's failure.
    #[error("Task panicked: {0}")]
    TaskPanic(String),

    /// Internal pool invariant violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    /// Create a source error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a sink error.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Create a task panic error.
    pub fn task_panic(msg: impl Into<String>) -> Self {
        Self::TaskPanic(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
