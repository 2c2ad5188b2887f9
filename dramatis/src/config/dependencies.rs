//! Dependency initialization and wiring for the ingest pipeline.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::AppError;
use dramatis_client::{ClientConfig, SqliteCache, WebClient};
use dramatis_ingest::{MemorySink, Pipeline, PipelineConfig};
use dramatis_shared::{
    TierThresholds, DEFAULT_THRESH_MAIN, DEFAULT_THRESH_RECURRING, DEFAULT_THRESH_SIDE,
};
use mock_source::MockSource;

/// Default base URL for the fan wiki.
const DEFAULT_WIKI_BASE_URL: &str = "https://seinfeld.fandom.com";

/// Default base URL for the transcript archive.
const DEFAULT_SCRIPT_BASE_URL: &str = "https://imsdb.com";

/// Default minimum interval between live wiki requests, in milliseconds.
const DEFAULT_WIKI_MIN_INTERVAL_MS: u64 = 250;

/// Default minimum interval between live archive requests, in
/// milliseconds. The archive is slower and stricter than the wiki.
const DEFAULT_SCRIPT_MIN_INTERVAL_MS: u64 = 1000;

/// Default retry budget per request.
const DEFAULT_FETCH_MAX_ATTEMPTS: usize = 5;

/// Default directory for the response caches.
const DEFAULT_CACHE_DIR: &str = "./cache";

/// Default cache entry lifetime, in hours.
const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

/// User agent sent with every live request.
const USER_AGENT: &str = "dramatis/0.1";

/// Per-request transport timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Container for all initialized dependencies.
///
/// The two web clients are the seam the HTML source adapters will fetch
/// through; until those adapters land, pipeline runs consume the
/// deterministic corpus and the clients (and their on-disk caches) sit
/// idle after startup.
pub struct Dependencies {
    /// Rate-limited caching client for the fan wiki.
    pub wiki_client: Arc<WebClient>,
    /// Rate-limited caching client for the transcript archive.
    pub script_client: Arc<WebClient>,
    /// The configured pipeline ready to run.
    pub pipeline: Arc<Pipeline>,
    /// The sink the pipeline writes to.
    pub sink: Arc<MemorySink>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `WIKI_BASE_URL`: fan wiki base URL (default: https://seinfeld.fandom.com)
    /// - `SCRIPT_BASE_URL`: transcript archive base URL (default: https://imsdb.com)
    /// - `WIKI_MIN_INTERVAL_MS`: minimum interval between live wiki requests (default: 250)
    /// - `SCRIPT_MIN_INTERVAL_MS`: minimum interval between live archive requests (default: 1000)
    /// - `FETCH_MAX_ATTEMPTS`: retry budget per request (default: 5)
    /// - `CACHE_DIR`: directory for the response caches (default: ./cache)
    /// - `CACHE_TTL_HOURS`: cache entry lifetime (default: 24)
    /// - `WORKER_COUNT`: pipeline worker pool size (default: available cores, capped at 8)
    /// - `TIER_MAIN`, `TIER_SIDE`, `TIER_RECURRING`: tier cut points
    ///
    /// A variable that is present but unparseable is a fatal
    /// configuration error, never silently replaced by a default.
    pub async fn new() -> Result<Self, AppError> {
        let wiki_base_url = env_or("WIKI_BASE_URL", DEFAULT_WIKI_BASE_URL);
        let script_base_url = env_or("SCRIPT_BASE_URL", DEFAULT_SCRIPT_BASE_URL);
        let wiki_interval =
            Duration::from_millis(parse_var("WIKI_MIN_INTERVAL_MS", DEFAULT_WIKI_MIN_INTERVAL_MS)?);
        let script_interval = Duration::from_millis(parse_var(
            "SCRIPT_MIN_INTERVAL_MS",
            DEFAULT_SCRIPT_MIN_INTERVAL_MS,
        )?);
        let max_attempts = parse_var("FETCH_MAX_ATTEMPTS", DEFAULT_FETCH_MAX_ATTEMPTS)?;
        let cache_dir = PathBuf::from(env_or("CACHE_DIR", DEFAULT_CACHE_DIR));
        let cache_ttl =
            chrono::Duration::hours(parse_var("CACHE_TTL_HOURS", DEFAULT_CACHE_TTL_HOURS)?);
        let workers = parse_var("WORKER_COUNT", dramatis_ingest::pool::default_workers())?;

        let thresholds = TierThresholds::new(
            parse_var("TIER_MAIN", DEFAULT_THRESH_MAIN)?,
            parse_var("TIER_SIDE", DEFAULT_THRESH_SIDE)?,
            parse_var("TIER_RECURRING", DEFAULT_THRESH_RECURRING)?,
        )?;

        info!(
            wiki_base_url = %wiki_base_url,
            script_base_url = %script_base_url,
            cache_dir = %cache_dir.display(),
            workers = workers,
            "Initializing dependencies"
        );

        std::fs::create_dir_all(&cache_dir)
            .map_err(|e| AppError::config(format!("Failed to create cache dir: {}", e)))?;

        let wiki_cache = Arc::new(SqliteCache::open(&cache_dir.join("wiki.sqlite"), cache_ttl)?);
        let wiki_client = Arc::new(WebClient::from_config(
            wiki_cache,
            ClientConfig::new(wiki_base_url)
                .with_min_interval(wiki_interval)
                .with_max_attempts(max_attempts)
                .with_user_agent(USER_AGENT)
                .with_request_timeout(REQUEST_TIMEOUT),
        )?);

        let script_cache =
            Arc::new(SqliteCache::open(&cache_dir.join("scripts.sqlite"), cache_ttl)?);
        let script_client = Arc::new(WebClient::from_config(
            script_cache,
            ClientConfig::new(script_base_url)
                .with_min_interval(script_interval)
                .with_max_attempts(max_attempts)
                .with_user_agent(USER_AGENT)
                .with_request_timeout(REQUEST_TIMEOUT),
        )?);

        info!("HTTP clients ready");

        // The HTML adapters for the two live sites implement the
        // source traits over these clients; until they land, runs use
        // the deterministic corpus so the pipeline is exercisable end
        // to end.
        let source = Arc::new(MockSource::new());
        let sink = Arc::new(MemorySink::new());

        let pipeline = Arc::new(Pipeline::with_config(
            source.clone(),
            source,
            sink.clone(),
            PipelineConfig {
                workers,
                thresholds,
            },
        ));

        Ok(Self {
            wiki_client,
            script_client,
            pipeline,
            sink,
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| AppError::config(format!("Invalid {}={}: {}", name, raw, e)))
}
