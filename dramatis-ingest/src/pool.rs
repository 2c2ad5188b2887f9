//! Bounded worker pool.
//!
//! [`WorkerPool::submit`] runs independent work items on spawned tasks,
//! with admission bounded by a semaphore sized to the pool. Results are
//! collected in completion order (no ordering guarantee) and merged
//! strictly by logical key; `submit` returns only after every spawned
//! item has been joined, so shutdown never strands in-flight work.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::errors::IngestError;

/// Optional per-item completion callback, invoked once per completed
/// item (success or failure). Omission does not affect correctness.
pub type Progress = Arc<dyn Fn() + Send + Sync>;

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of items allowed in flight at once.
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

/// Default pool size: available cores, capped at 8.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(8)
}

/// Fixed-size pool of parallel workers over independent work items.
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with the given configuration.
    pub fn new(config: PoolConfig) -> Self {
        let workers = config.workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Number of workers in the pool.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every item exactly once and collect the results by key.
    ///
    /// A failing item's error surfaces in its own map slot without
    /// cancelling siblings; a panicking item is caught at join and
    /// recorded as that item's failure. The progress callback fires
    /// once per completed item, independent of completion order.
    pub async fn submit<K, T, Fut>(
        &self,
        items: Vec<(K, Fut)>,
        progress: Option<Progress>,
    ) -> HashMap<K, Result<T, IngestError>>
    where
        K: Eq + Hash + Send + 'static,
        T: Send + 'static,
        Fut: Future<Output = Result<T, IngestError>> + Send + 'static,
    {
        let total = items.len();
        let mut tasks = FuturesUnordered::new();

        for (key, fut) in items {
            let semaphore = self.semaphore.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| IngestError::internal("worker pool semaphore closed"))?;
                fut.await
            });
            tasks.push(async move { (key, handle.await) });
        }

        let mut results = HashMap::with_capacity(total);
        while let Some((key, joined)) = tasks.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(IngestError::task_panic(e.to_string())),
            };
            results.insert(key, result);

            if let Some(tick) = &progress {
                tick();
            }
        }

        debug!(total = total, "Pool batch complete");
        results
    }
}
