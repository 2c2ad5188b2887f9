//! # Dramatis Ingest
//!
//! Concurrent ingest pipeline for the dramatis system.
//!
//! ## Architecture
//!
//! The pipeline runs ordered stages over a shared bounded worker pool:
//!
//! 1. **discover**: fan out the alphabet against the cast source to
//!    collect every cast page path.
//! 2. **rank**: count cross-references among cast pages to derive the
//!    popularity ranking.
//! 3. **cast**: fetch every cast member record.
//! 4. **seasons**: fetch the season/episode listing.
//! 5. **scripts**: fetch every episode script.
//! 6. **resolve & write**: build the resolver once, attribute every
//!    script line to a cast member, and write batches to the sink.
//!
//! Work items are independent; results are collected in completion
//! order and merged strictly by natural key. One item's failure never
//! aborts its siblings, and every failure is counted in the run report.

pub mod errors;
pub mod pipeline;
pub mod pool;
pub mod report;
pub mod sink;
pub mod sources;

pub use errors::IngestError;
pub use pipeline::{Pipeline, PipelineConfig};
pub use pool::{PoolConfig, Progress, WorkerPool};
pub use report::{ResolutionStats, RunReport, StageFailure, StageSummary};
pub use sink::{MemorySink, RecordSink};
pub use sources::{CastSource, ScriptSource};
