//! Source adapter traits.
//!
//! The concrete adapters (wiki cast pages, transcript archive) parse
//! page-specific HTML and are external to this crate; they fetch
//! through [`dramatis_client::WebClient`] and implement these traits.
//! The in-workspace `mock-source` crate provides deterministic
//! implementations for tests and demo runs.

use async_trait::async_trait;

use dramatis_shared::{CastMember, ScriptLine, SeasonRecord};

use crate::errors::IngestError;

/// Produces canonical cast records from the fan wiki.
#[async_trait]
pub trait CastSource: Send + Sync {
    /// Paths of cast pages whose title starts with `letter`.
    async fn paths_by_letter(&self, letter: char) -> Result<Vec<String>, IngestError>;

    /// Paths linked from the given cast page (used for popularity
    /// ranking; may include non-cast paths, which callers ignore).
    async fn outbound_paths(&self, path: &str) -> Result<Vec<String>, IngestError>;

    /// The full cast member record for one page.
    async fn cast_member(&self, path: &str) -> Result<CastMember, IngestError>;
}

/// Produces season listings and episode scripts from the transcript
/// archive.
#[async_trait]
pub trait ScriptSource: Send + Sync {
    /// All seasons with their episode metadata.
    async fn seasons(&self) -> Result<Vec<SeasonRecord>, IngestError>;

    /// The script for one episode, keyed by its title.
    async fn script(&self, episode_title: &str) -> Result<Vec<ScriptLine>, IngestError>;
}
