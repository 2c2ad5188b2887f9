//! # Dramatis
//!
//! Main library for the dramatis dialogue ingest system.
//!
//! This crate provides the entry point and configuration for running
//! the ingest pipeline: cast discovery and ranking from the fan wiki,
//! script fetching from the transcript archive, and mention resolution
//! onto the canonical cast.

pub mod config;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur during startup or execution.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] dramatis_ingest::IngestError),

    /// Tier threshold error.
    #[error("Tier error: {0}")]
    TierError(#[from] dramatis_shared::TierError),

    /// HTTP client error.
    #[error("Fetch error: {0}")]
    FetchError(#[from] dramatis_client::FetchError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
