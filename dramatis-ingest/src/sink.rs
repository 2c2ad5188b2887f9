//! Record sink trait and in-memory implementation.
//!
//! Persistence is external to this crate: the pipeline hands typed
//! batches, keyed by stable natural keys, to whatever implements
//! [`RecordSink`]. [`MemorySink`] collects batches in memory for tests
//! and demo runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use dramatis_shared::{EpisodeRoster, RankedMember, ResolvedLine, SeasonRecord};

use crate::errors::IngestError;

/// Accepts typed record batches from the pipeline.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write the canonical cast with popularity ranks.
    async fn write_cast(&self, members: &[RankedMember]) -> Result<(), IngestError>;

    /// Write the season listing.
    async fn write_seasons(&self, seasons: &[SeasonRecord]) -> Result<(), IngestError>;

    /// Write per-episode rosters, keyed by (season, episode).
    async fn write_episodes(&self, rosters: &[EpisodeRoster]) -> Result<(), IngestError>;

    /// Write resolved dialogue, keyed by (season, episode, line, member).
    async fn write_lines(&self, lines: &[ResolvedLine]) -> Result<(), IngestError>;
}

/// In-memory sink for tests and demo runs.
#[derive(Default)]
pub struct MemorySink {
    cast: RwLock<Vec<RankedMember>>,
    seasons: RwLock<Vec<SeasonRecord>>,
    episodes: RwLock<Vec<EpisodeRoster>>,
    lines: RwLock<Vec<ResolvedLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All cast members written so far.
    pub async fn cast(&self) -> Vec<RankedMember> {
        self.cast.read().await.clone()
    }

    /// All seasons written so far.
    pub async fn seasons(&self) -> Vec<SeasonRecord> {
        self.seasons.read().await.clone()
    }

    /// All episode rosters written so far.
    pub async fn episodes(&self) -> Vec<EpisodeRoster> {
        self.episodes.read().await.clone()
    }

    /// All resolved lines written so far.
    pub async fn lines(&self) -> Vec<ResolvedLine> {
        self.lines.read().await.clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn write_cast(&self, members: &[RankedMember]) -> Result<(), IngestError> {
        self.cast.write().await.extend_from_slice(members);
        Ok(())
    }

    async fn write_seasons(&self, seasons: &[SeasonRecord]) -> Result<(), IngestError> {
        self.seasons.write().await.extend_from_slice(seasons);
        Ok(())
    }

    async fn write_episodes(&self, rosters: &[EpisodeRoster]) -> Result<(), IngestError> {
        self.episodes.write().await.extend_from_slice(rosters);
        Ok(())
    }

    async fn write_lines(&self, lines: &[ResolvedLine]) -> Result<(), IngestError> {
        self.lines.write().await.extend_from_slice(lines);
        Ok(())
    }
}
