//! Ingest pipeline stages.
//!
//! Stages run in order, each fanning out over the shared worker pool
//! and merging results by natural key. A failed item is excluded from
//! later stages and reported distinctly in the run report; it never
//! aborts its siblings. Between stages the pipeline honors a shutdown
//! signal: in-flight items complete, later stages are skipped, and the
//! report marks the run interrupted.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use dramatis_resolver::{split_speakers, Resolver};
use dramatis_shared::{
    CastMember, EpisodeKey, EpisodeRecord, EpisodeRoster, LineKey, RankedMember, ResolvedLine,
    ScriptLine, SeasonRecord, TierThresholds,
};

use crate::errors::IngestError;
use crate::pool::{PoolConfig, Progress, WorkerPool};
use crate::report::{ResolutionStats, RunReport, StageSummary};
use crate::sink::RecordSink;
use crate::sources::{CastSource, ScriptSource};

/// Configuration for the ingest pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Worker pool size.
    pub workers: usize,
    /// Cut points for the derived cast tiers.
    pub thresholds: TierThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: crate::pool::default_workers(),
            thresholds: TierThresholds::default(),
        }
    }
}

/// Pipeline that drives the full ingest run: discover cast pages, rank
/// them by cross-references, fetch cast and scripts, resolve every
/// mention, and write batches to the sink.
pub struct Pipeline {
    cast_source: Arc<dyn CastSource>,
    script_source: Arc<dyn ScriptSource>,
    sink: Arc<dyn RecordSink>,
    pool: WorkerPool,
    config: PipelineConfig,
    progress: Option<Progress>,
    shutdown: AtomicBool,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new(
        cast_source: Arc<dyn CastSource>,
        script_source: Arc<dyn ScriptSource>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self::with_config(cast_source, script_source, sink, PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(
        cast_source: Arc<dyn CastSource>,
        script_source: Arc<dyn ScriptSource>,
        sink: Arc<dyn RecordSink>,
        config: PipelineConfig,
    ) -> Self {
        let pool = WorkerPool::new(PoolConfig {
            workers: config.workers,
        });

        Self {
            cast_source,
            script_source,
            sink,
            pool,
            config,
            progress: None,
            shutdown: AtomicBool::new(false),
        }
    }

    /// Attach a progress callback, invoked once per completed work
    /// item across all stages.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Request a graceful shutdown: in-flight stage items complete,
    /// later stages are skipped, and the report marks the run
    /// interrupted.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn interrupted(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Run the full pipeline. Returns the run report; a sink failure or
    /// an unusable canonical feed (empty cast, missing ranks) is fatal.
    #[instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn run(&self) -> Result<RunReport, IngestError> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let mut report = RunReport::new(run_id);
        info!(run_id = %run_id, "Starting ingest run");

        let paths = self.discover(&mut report.discover).await;
        if self.check_interrupted(&mut report) {
            return Ok(report);
        }

        let ranks = self.rank(&paths, &mut report.rank).await;
        if self.check_interrupted(&mut report) {
            return Ok(report);
        }

        let members = self.fetch_cast(&paths, &mut report.cast).await;
        if self.check_interrupted(&mut report) {
            return Ok(report);
        }

        let seasons = self.fetch_seasons(&mut report.seasons).await;
        if self.check_interrupted(&mut report) {
            return Ok(report);
        }

        let scripts = self.fetch_scripts(&seasons, &mut report.scripts).await;
        if self.check_interrupted(&mut report) {
            return Ok(report);
        }

        self.resolve_and_write(members, &ranks, &seasons, scripts, &mut report)
            .await?;

        info!(
            run_id = %run_id,
            episodes = report.resolve.succeeded,
            mentions = report.resolution.mentions,
            unmatched = report.resolution.unmatched,
            "Ingest run complete"
        );
        Ok(report)
    }

    fn check_interrupted(&self, report: &mut RunReport) -> bool {
        if self.interrupted() {
            warn!("Shutdown requested; skipping remaining stages");
            report.interrupted = true;
            return true;
        }
        false
    }

    /// Stage 1: fan out the alphabet against the cast source and union
    /// the discovered page paths into a sorted list.
    async fn discover(&self, summary: &mut StageSummary) -> Vec<String> {
        let items: Vec<(String, _)> = ('A'..='Z')
            .map(|letter| {
                let source = self.cast_source.clone();
                (
                    letter.to_string(),
                    async move { source.paths_by_letter(letter).await },
                )
            })
            .collect();

        let results = self.pool.submit(items, self.progress.clone()).await;

        let mut paths = BTreeSet::new();
        for (letter, result) in results {
            match result {
                Ok(found) => {
                    summary.record_success();
                    paths.extend(found);
                }
                Err(e) => {
                    warn!(letter = %letter, error = %e, "Letter discovery failed");
                    summary.record_failure(letter, e);
                }
            }
        }

        info!(paths = paths.len(), "Discovered cast pages");
        paths.into_iter().collect()
    }

    /// Stage 2: count cross-references among the discovered pages and
    /// derive the popularity ranking: share of total hits descending,
    /// path ascending, rank 1-based.
    async fn rank(&self, paths: &[String], summary: &mut StageSummary) -> HashMap<String, u32> {
        let items: Vec<(String, _)> = paths
            .iter()
            .map(|path| {
                let source = self.cast_source.clone();
                let path_ = path.clone();
                (
                    path.clone(),
                    async move { source.outbound_paths(&path_).await },
                )
            })
            .collect();

        let results = self.pool.submit(items, self.progress.clone()).await;

        let discovered: HashSet<&String> = paths.iter().collect();
        let mut hits: HashMap<String, usize> = HashMap::new();
        for (path, result) in results {
            match result {
                Ok(outbound) => {
                    summary.record_success();
                    for target in outbound {
                        if discovered.contains(&target) {
                            *hits.entry(target).or_default() += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Cross-reference fetch failed");
                    summary.record_failure(path, e);
                }
            }
        }

        let total: usize = hits.values().sum();
        let mut shares: Vec<(f64, &String)> = paths
            .iter()
            .map(|path| {
                let share = if total > 0 {
                    hits.get(path).copied().unwrap_or(0) as f64 / total as f64
                } else {
                    0.0
                };
                (share, path)
            })
            .collect();

        shares.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(b.1))
        });

        shares
            .into_iter()
            .enumerate()
            .map(|(i, (_, path))| (path.clone(), i as u32 + 1))
            .collect()
    }

    /// Stage 3: fetch the full record for every cast page.
    async fn fetch_cast(&self, paths: &[String], summary: &mut StageSummary) -> Vec<CastMember> {
        let items: Vec<(String, _)> = paths
            .iter()
            .map(|path| {
                let source = self.cast_source.clone();
                let path_ = path.clone();
                (path.clone(), async move { source.cast_member(&path_).await })
            })
            .collect();

        let results = self.pool.submit(items, self.progress.clone()).await;

        let mut members = Vec::new();
        for (path, result) in results {
            match result {
                Ok(member) => {
                    summary.record_success();
                    members.push(member);
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Cast page fetch failed");
                    summary.record_failure(path, e);
                }
            }
        }

        members.sort_by(|a, b| a.path.cmp(&b.path));
        members
    }

    /// Stage 4: fetch the season listing (a single work item).
    async fn fetch_seasons(&self, summary: &mut StageSummary) -> Vec<SeasonRecord> {
        match self.script_source.seasons().await {
            Ok(mut seasons) => {
                summary.record_success();
                seasons.sort_by_key(|s| s.number);
                if let Some(tick) = &self.progress {
                    tick();
                }
                seasons
            }
            Err(e) => {
                warn!(error = %e, "Season listing fetch failed");
                summary.record_failure("seasons", e);
                Vec::new()
            }
        }
    }

    /// Stage 5: fetch every episode script, merged by episode key. A
    /// failed fetch excludes that episode from the resolve stage and is
    /// recorded under its key.
    async fn fetch_scripts(
        &self,
        seasons: &[SeasonRecord],
        summary: &mut StageSummary,
    ) -> BTreeMap<EpisodeKey, Vec<ScriptLine>> {
        let mut items = Vec::new();
        for season in seasons {
            for episode in &season.episodes {
                let source = self.script_source.clone();
                let title = episode.title.clone();
                items.push((
                    EpisodeKey::new(season.number, episode.number),
                    async move { source.script(&title).await },
                ));
            }
        }

        let results = self.pool.submit(items, self.progress.clone()).await;

        let mut scripts = BTreeMap::new();
        for (key, result) in results {
            match result {
                Ok(lines) => {
                    summary.record_success();
                    scripts.insert(key, lines);
                }
                Err(e) => {
                    warn!(episode = %key, error = %e, "Script fetch failed");
                    summary.record_failure(key.to_string(), e);
                }
            }
        }

        scripts
    }

    /// Stage 6: build the resolver once, attribute every script line,
    /// and write cast, seasons, rosters, and lines to the sink. Also
    /// derives the per-member tiers from the episode rosters.
    async fn resolve_and_write(
        &self,
        members: Vec<CastMember>,
        ranks: &HashMap<String, u32>,
        seasons: &[SeasonRecord],
        scripts: BTreeMap<EpisodeKey, Vec<ScriptLine>>,
        report: &mut RunReport,
    ) -> Result<(), IngestError> {
        // Indices are built once, single-threaded, before any
        // resolution; they are read-only afterwards.
        let resolver = Resolver::new(members.clone(), ranks)?;

        let mut ranked = Vec::with_capacity(members.len());
        for member in &members {
            let rank = ranks
                .get(&member.path)
                .copied()
                .ok_or_else(|| IngestError::internal(format!("no rank for {}", member.path)))?;
            ranked.push(RankedMember {
                rank,
                member: member.clone(),
            });
        }
        ranked.sort_by_key(|r| r.rank);

        self.sink.write_cast(&ranked).await?;
        self.sink.write_seasons(seasons).await?;

        let mut metadata: HashMap<EpisodeKey, &EpisodeRecord> = HashMap::new();
        for season in seasons {
            for episode in &season.episodes {
                metadata.insert(EpisodeKey::new(season.number, episode.number), episode);
            }
        }

        let mut stats = ResolutionStats::default();
        let mut rosters = Vec::new();
        let mut lines: BTreeMap<LineKey, ResolvedLine> = BTreeMap::new();

        for (key, script) in &scripts {
            let Some(episode) = metadata.get(key) else {
                report
                    .resolve
                    .record_failure(key.to_string(), "episode metadata missing");
                continue;
            };

            let mut roster = BTreeSet::new();
            for line in script {
                for mention in split_speakers(&line.speaker) {
                    stats.mentions += 1;
                    match resolver.resolve(&mention) {
                        Some(resolution) => {
                            stats.resolved += 1;
                            roster.insert(resolution.member.path.clone());

                            let line_key = LineKey {
                                season: key.season,
                                episode: key.episode,
                                line: line.number,
                                member: resolution.member.path,
                            };
                            lines.entry(line_key.clone()).or_insert(ResolvedLine {
                                key: line_key,
                                dialogue: line.dialogue.clone(),
                                confidence: resolution.confidence,
                            });
                        }
                        // An unmatchable mention is a legitimate
                        // outcome: counted, never fatal.
                        None => stats.unmatched += 1,
                    }
                }
            }

            rosters.push(EpisodeRoster {
                key: *key,
                title: episode.title.clone(),
                air_date: episode.air_date,
                writers: episode.writers.clone(),
                cast: roster.into_iter().collect(),
            });
            report.resolve.record_success();
        }

        let lines: Vec<ResolvedLine> = lines.into_values().collect();
        self.sink.write_episodes(&rosters).await?;
        self.sink.write_lines(&lines).await?;

        // Tiers: distinct episodes featuring the member over total
        // episodes actually processed.
        let total = rosters.len();
        let mut appearances: HashMap<&str, usize> = HashMap::new();
        for roster in &rosters {
            for path in &roster.cast {
                *appearances.entry(path.as_str()).or_default() += 1;
            }
        }
        report.tiers = members
            .iter()
            .map(|member| {
                let count = appearances.get(member.path.as_str()).copied().unwrap_or(0);
                (
                    member.path.clone(),
                    self.config.thresholds.classify(count, total),
                )
            })
            .collect();

        report.resolution = stats;
        Ok(())
    }
}
