//! Response cache keyed by request identity.
//!
//! The cache key is the SHA-256 of (method, full URL) only; headers and
//! bodies are deliberately excluded so that an identical request always
//! maps to the same entry. Expiry is enforced on read: an entry older
//! than the store's TTL is reported as a miss and overwritten by the
//! next successful live fetch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use url::Url;

use crate::errors::FetchError;
use crate::transport::Method;

/// Compute the cache key for a request: hex SHA-256 of (method, URL).
pub fn request_key(method: Method, url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_str().as_bytes());
    hasher.update(url.as_str().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A cached response together with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub status: u16,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

/// Persistent store for cached responses.
///
/// Stores must support concurrent reads; `get` honors the store's TTL
/// and never returns an expired entry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a fresh entry by key. Expired entries are misses.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, FetchError>;

    /// Insert or overwrite an entry.
    async fn put(&self, entry: CacheEntry) -> Result<(), FetchError>;
}

/// In-memory cache for tests and ephemeral runs.
pub struct MemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, FetchError> {
        let entries = self.entries.read().await;
        let entry = entries.get(key).filter(|e| Utc::now() - e.fetched_at < self.ttl);
        Ok(entry.cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), FetchError> {
        self.entries.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }
}

/// SQLite-backed cache that outlives a single run.
///
/// rusqlite is blocking, so every call is moved off the async executor
/// with `spawn_blocking`; the connection itself is serialized behind a
/// mutex.
pub struct SqliteCache {
    ttl: Duration,
    conn: Arc<Mutex<rusqlite::Connection>>,
    path: PathBuf,
}

impl SqliteCache {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &Path, ttl: Duration) -> Result<Self, FetchError> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| FetchError::cache(format!("failed to open {}: {}", path.display(), e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS responses (
                key        TEXT PRIMARY KEY,
                status     INTEGER NOT NULL,
                body       TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| FetchError::cache(format!("failed to create schema: {}", e)))?;

        Ok(Self {
            ttl,
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_path_buf(),
        })
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CacheStore for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, FetchError> {
        let conn = self.conn.clone();
        let key = key.to_string();
        let ttl = self.ttl;

        let entry = tokio::task::spawn_blocking(move || -> Result<Option<CacheEntry>, String> {
            let conn = conn.lock().map_err(|e| e.to_string())?;
            let mut stmt = conn
                .prepare("SELECT status, body, fetched_at FROM responses WHERE key = ?1")
                .map_err(|e| e.to_string())?;

            let mut rows = stmt.query([&key]).map_err(|e| e.to_string())?;
            let row = match rows.next().map_err(|e| e.to_string())? {
                Some(row) => row,
                None => return Ok(None),
            };

            let status: u16 = row.get(0).map_err(|e| e.to_string())?;
            let body: String = row.get(1).map_err(|e| e.to_string())?;
            let fetched_at: String = row.get(2).map_err(|e| e.to_string())?;
            let fetched_at = fetched_at
                .parse::<DateTime<Utc>>()
                .map_err(|e| e.to_string())?;

            Ok(Some(CacheEntry {
                key,
                status,
                body,
                fetched_at,
            }))
        })
        .await
        .map_err(|e| FetchError::cache(format!("cache task failed: {}", e)))?
        .map_err(FetchError::cache)?;

        Ok(entry.filter(|e| Utc::now() - e.fetched_at < ttl))
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), FetchError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Result<(), String> {
            let conn = conn.lock().map_err(|e| e.to_string())?;
            conn.execute(
                "INSERT OR REPLACE INTO responses (key, status, body, fetched_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    entry.key,
                    entry.status,
                    entry.body,
                    entry.fetched_at.to_rfc3339(),
                ],
            )
            .map_err(|e| e.to_string())?;
            Ok(())
        })
        .await
        .map_err(|e| FetchError::cache(format!("cache task failed: {}", e)))?
        .map_err(FetchError::cache)?;

        Ok(())
    }
}
