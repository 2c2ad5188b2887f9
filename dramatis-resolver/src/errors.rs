//! Error types for resolver construction.
//!
//! Resolution itself is infallible: an unmatchable mention is a
//! legitimate "no match", not an error. Only building the resolver from
//! an invalid canonical feed can fail, and that is fatal before any
//! work begins.

use thiserror::Error;

/// Errors raised while building a [`crate::Resolver`].
#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    /// The canonical cast list was empty.
    #[error("Cast list is empty")]
    EmptyCast,

    /// A cast member has no popularity rank.
    #[error("Missing popularity rank for {0}")]
    MissingRank(String),
}
