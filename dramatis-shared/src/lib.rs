//! # Dramatis Shared
//!
//! Shared types and data structures for the dramatis ingestion system.
//!
//! This crate defines the typed records that flow between the source
//! adapters, the resolver, the ingest pipeline, and the record sink,
//! along with the natural keys that identify them and the cast tier
//! classifier that consumes persisted aggregates.

pub mod records;
pub mod tier;

pub use records::{
    CastMember, EpisodeKey, EpisodeRecord, EpisodeRoster, LineKey, RankedMember, ResolvedLine,
    ScriptLine, SeasonRecord,
};
pub use tier::{
    CastTier, TierError, TierThresholds, DEFAULT_THRESH_MAIN, DEFAULT_THRESH_RECURRING,
    DEFAULT_THRESH_SIDE,
};
