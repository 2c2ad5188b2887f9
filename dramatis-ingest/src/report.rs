//! Run reporting.
//!
//! Every stage produces a [`StageSummary`]; a failed item is reported
//! distinctly, never silently dropped. The [`RunReport`] aggregates all
//! summaries plus resolution statistics and the derived cast tiers.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use dramatis_shared::CastTier;

/// One recorded item failure: the item's natural key and its error.
#[derive(Debug, Clone, Serialize)]
pub struct StageFailure {
    pub key: String,
    pub error: String,
}

/// Attempted/succeeded/failed counts for one pipeline stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<StageFailure>,
}

impl StageSummary {
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, key: impl Into<String>, error: impl std::fmt::Display) {
        self.attempted += 1;
        self.failed += 1;
        self.failures.push(StageFailure {
            key: key.into(),
            error: error.to_string(),
        });
    }
}

/// Mention-level statistics from the resolve stage. An unmatched
/// mention is a legitimate outcome, counted but never fatal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionStats {
    pub mentions: usize,
    pub resolved: usize,
    pub unmatched: usize,
}

/// Full accounting for one ingest run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Correlation id for this run's logs.
    pub run_id: Uuid,
    pub discover: StageSummary,
    pub rank: StageSummary,
    pub cast: StageSummary,
    pub seasons: StageSummary,
    pub scripts: StageSummary,
    pub resolve: StageSummary,
    pub resolution: ResolutionStats,
    /// Derived importance tier per cast member path.
    pub tiers: HashMap<String, CastTier>,
    /// True when a shutdown signal cut the run short.
    pub interrupted: bool,
}

impl RunReport {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            discover: StageSummary::default(),
            rank: StageSummary::default(),
            cast: StageSummary::default(),
            seasons: StageSummary::default(),
            scripts: StageSummary::default(),
            resolve: StageSummary::default(),
            resolution: ResolutionStats::default(),
            tiers: HashMap::new(),
            interrupted: false,
        }
    }
}
