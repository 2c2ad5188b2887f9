//! Deterministic mock sources for testing the ingest pipeline.
//!
//! This crate provides a single source of truth for the mock cast wiki
//! and transcript archive, so pipeline tests and demo runs consume the
//! same data.
//!
//! # Architecture
//!
//! In production, the pipeline fetches from two live sites:
//!
//! ```text
//! Fan wiki ───────────┬→ Pipeline → RecordSink
//! Transcript archive ─┘
//! ```
//!
//! For testing, [`MockSource`] implements both source traits over a
//! fixed corpus:
//!
//! ```text
//! MockSource ─┬→ Pipeline → MemorySink
//!             └→ (same instance serves cast pages and scripts)
//! ```
//!
//! The corpus is small enough to verify by hand and exercises every
//! resolution path: exact names, aliases, joined speaker credits,
//! shared surnames, misspellings, scene headings, and names that match
//! nobody. The `*_COUNT` constants describe the corpus so tests can
//! assert exact totals.
//!
//! # Usage
//!
//! ```rust
//! use mock_source::MockSource;
//!
//! let source = MockSource::new();
//!
//! // Inject a failure for one episode to test isolation:
//! let flaky = MockSource::new().with_failing_script("The Robbery");
//! ```

mod corpus;

pub use corpus::{
    CAST_COUNT, DONNA, ELAINE, EPISODE_COUNT, FRANK, GEORGE, JACKIE, JERRY, KRAMER,
    MENTION_COUNT, NEWMAN, RESOLVED_COUNT, UNMATCHED_COUNT,
};

use std::collections::HashSet;

use async_trait::async_trait;

use dramatis_ingest::{CastSource, IngestError, ScriptSource};
use dramatis_shared::{CastMember, ScriptLine, SeasonRecord};

/// Deterministic implementation of both source traits over the fixed
/// corpus.
#[derive(Debug, Default, Clone)]
pub struct MockSource {
    failing_scripts: HashSet<String>,
}

impl MockSource {
    /// Create a source serving the full corpus without failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the script fetch for the given episode title fail.
    pub fn with_failing_script(mut self, title: impl Into<String>) -> Self {
        self.failing_scripts.insert(title.into());
        self
    }
}

#[async_trait]
impl CastSource for MockSource {
    async fn paths_by_letter(&self, letter: char) -> Result<Vec<String>, IngestError> {
        Ok(corpus::paths_by_letter(letter))
    }

    async fn outbound_paths(&self, path: &str) -> Result<Vec<String>, IngestError> {
        corpus::outbound_paths(path)
            .ok_or_else(|| IngestError::source(format!("unknown cast page: {path}")))
    }

    async fn cast_member(&self, path: &str) -> Result<CastMember, IngestError> {
        corpus::cast_member(path)
            .ok_or_else(|| IngestError::source(format!("unknown cast page: {path}")))
    }
}

#[async_trait]
impl ScriptSource for MockSource {
    async fn seasons(&self) -> Result<Vec<SeasonRecord>, IngestError> {
        Ok(corpus::seasons())
    }

    async fn script(&self, episode_title: &str) -> Result<Vec<ScriptLine>, IngestError> {
        if self.failing_scripts.contains(episode_title) {
            return Err(IngestError::source(format!(
                "script fetch failed for {episode_title}"
            )));
        }
        corpus::script(episode_title)
            .ok_or_else(|| IngestError::source(format!("unknown episode: {episode_title}")))
    }
}
