//! Typed records exchanged between the source adapters, the resolver,
//! and the record sink.
//!
//! Records are plain serde-serializable data. Natural keys (`EpisodeKey`,
//! `LineKey`) are the stable identities batches are merged and persisted
//! under; merge order never matters because every key is unique.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A canonical cast member, built from one wiki cast page.
///
/// The page path doubles as the member's stable id; the display name is
/// the identity noisy script mentions are resolved onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    /// Wiki page path, e.g. `/wiki/Jerry_Seinfeld`. Stable id.
    pub path: String,
    /// Canonical display name as titled on the page.
    pub name: String,
    /// Gender as stated (or inferred) on the page.
    pub gender: String,
    /// Occupation as stated on the page.
    pub occupation: String,
    /// Actors credited with portraying the member.
    pub portrayed_by: Vec<String>,
    /// Disambiguation qualifier from the page title, e.g. the episode
    /// name in `"Donna (The Stock Tip)"`. `None` for unqualified pages.
    pub qualifier: Option<String>,
}

/// A cast member paired with its popularity rank (1-based, lower is
/// more popular). The rank is derived from cross-references among cast
/// pages and used only as a deterministic tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMember {
    pub rank: u32,
    pub member: CastMember,
}

/// One season of the show with its episode listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub number: u32,
    pub episodes: Vec<EpisodeRecord>,
}

/// Episode metadata from the transcript archive listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// 1-based position within the season.
    pub number: u32,
    pub title: String,
    pub air_date: NaiveDate,
    pub writers: Vec<String>,
}

/// One line of dialogue as extracted from an episode script.
///
/// `speaker` is the raw, as-written credit and may name several people
/// joined by `AND`/`&`/`,`; it has not been matched to any cast member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    /// 1-based line number within the script.
    pub number: u32,
    pub speaker: String,
    pub dialogue: String,
}

/// Natural key for an episode: (season number, episode number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EpisodeKey {
    pub season: u32,
    pub episode: u32,
}

/// Natural key for a resolved line of dialogue.
///
/// Includes the resolved member path because a joined speaker credit
/// produces one resolved line per member for the same script line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineKey {
    pub season: u32,
    pub episode: u32,
    pub line: u32,
    /// Path of the resolved cast member.
    pub member: String,
}

/// A line of dialogue attributed to a resolved cast member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub key: LineKey,
    pub dialogue: String,
    /// Resolver confidence for the attribution, in [0, 1].
    pub confidence: f64,
}

/// An episode with its metadata and the distinct cast members that were
/// resolved from its script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRoster {
    pub key: EpisodeKey,
    pub title: String,
    pub air_date: NaiveDate,
    pub writers: Vec<String>,
    /// Paths of the distinct members appearing in the episode, sorted.
    pub cast: Vec<String>,
}

impl EpisodeKey {
    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

impl std::fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{:02}e{:02}", self.season, self.episode)
    }
}
