//! Caching, rate-limited web client.
//!
//! This module provides the main client used by the source adapters.
//! Every request is first checked against the cache; a hit is returned
//! verbatim and never touches the rate limiter. A miss passes through
//! the client's gate, which enforces a minimum interval between *live*
//! requests, and is retried with exponential backoff on transient
//! failure.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::cache::{request_key, CacheEntry, CacheStore};
use crate::errors::FetchError;
use crate::transport::{HttpTransport, Method, ReqwestTransport};

/// Configuration for a [`WebClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all request paths are joined against.
    pub base_url: String,
    /// Minimum interval between two live requests from this client.
    pub min_interval: Duration,
    /// Total number of attempts before giving up on a transient failure.
    pub max_attempts: usize,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Per-request transport timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            min_interval: Duration::from_millis(250),
            max_attempts: 5,
            user_agent: "dramatis/0.1".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Create a config for the given base URL with default limits.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the minimum interval between live requests.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Set the retry budget.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the user agent, applied when the client builds its own
    /// transport via [`WebClient::from_config`].
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request transport timeout, applied when the client
    /// builds its own transport via [`WebClient::from_config`].
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// A fetched document and whether it was served from the cache.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub body: String,
    pub from_cache: bool,
}

/// Per-source HTTP client with persistent cache, minimum-interval rate
/// limiting, and retry with exponential backoff.
///
/// The gate (time of the last live request) is owned by the instance,
/// so two clients pointed at different sources never interfere. Many
/// callers may invoke concurrently; the gate is the sole mutual
/// exclusion point and cache reads stay concurrent.
pub struct WebClient {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<dyn CacheStore>,
    config: ClientConfig,
    base_url: Url,
    gate: Mutex<Option<Instant>>,
}

impl WebClient {
    /// Create a client whose transport is built from the config's user
    /// agent and request timeout. This is the production constructor.
    pub fn from_config(
        cache: Arc<dyn CacheStore>,
        config: ClientConfig,
    ) -> Result<Self, FetchError> {
        let transport = Arc::new(ReqwestTransport::new(
            &config.user_agent,
            config.request_timeout,
        )?);
        Self::new(transport, cache, config)
    }

    /// Create a client over an already-built transport and cache. The
    /// transport keeps whatever user agent and timeout it was built
    /// with; the config's `user_agent` and `request_timeout` only apply
    /// through [`WebClient::from_config`].
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn CacheStore>,
        config: ClientConfig,
    ) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::invalid_url(format!("{}: {}", config.base_url, e)))?;

        Ok(Self {
            transport,
            cache,
            config,
            base_url,
            gate: Mutex::new(None),
        })
    }

    /// Issue a GET request for `path` with the given query parameters.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Fetched, FetchError> {
        self.request(Method::Get, path, params, None).await
    }

    /// Issue a POST request for `path` with query parameters and an
    /// optional URL-encoded form body.
    pub async fn post(
        &self,
        path: &str,
        params: &[(&str, &str)],
        form: Option<&[(String, String)]>,
    ) -> Result<Fetched, FetchError> {
        self.request(Method::Post, path, params, form).await
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::invalid_url(format!("{}: {}", path, e)))?;

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    #[instrument(skip(self, form), fields(method = method.as_str(), path = path))]
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        form: Option<&[(String, String)]>,
    ) -> Result<Fetched, FetchError> {
        let url = self.build_url(path, params)?;
        let key = request_key(method, &url);

        // A cache hit is returned verbatim and never metered.
        if let Some(entry) = self.cache.get(&key).await? {
            debug!(key = %key, "Cache hit");
            return Ok(Fetched {
                body: entry.body,
                from_cache: true,
            });
        }

        let mut errors = Vec::new();
        for attempt in 0..self.config.max_attempts {
            match self.live_fetch(method, &url, form, &key).await {
                Ok(fetched) => return Ok(fetched),
                Err(err) if err.is_transient() => {
                    warn!(
                        url = %url,
                        attempt = attempt,
                        error = %err,
                        "Transient fetch failure"
                    );
                    errors.push(err.to_string());

                    // Backoff happens outside the gate; the next attempt
                    // passes through it anew.
                    if attempt + 1 < self.config.max_attempts {
                        tokio::time::sleep(Duration::from_secs(1u64 << attempt)).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(FetchError::RetriesExhausted {
            attempts: self.config.max_attempts,
            errors,
        })
    }

    /// Perform one live request through the rate-limit gate.
    async fn live_fetch(
        &self,
        method: Method,
        url: &Url,
        form: Option<&[(String, String)]>,
        key: &str,
    ) -> Result<Fetched, FetchError> {
        let mut gate = self.gate.lock().await;

        if let Some(last) = *gate {
            let elapsed = last.elapsed();
            if elapsed < self.config.min_interval {
                tokio::time::sleep(self.config.min_interval - elapsed).await;
            }
        }

        let response = self.transport.execute(method, url, form).await?;

        // Only a response that actually came back stamps the gate.
        *gate = Some(Instant::now());
        drop(gate);

        if !(200..300).contains(&response.status) {
            return Err(FetchError::Status {
                status: response.status,
                url: url.to_string(),
            });
        }

        self.cache
            .put(CacheEntry {
                key: key.to_string(),
                status: response.status,
                body: response.body.clone(),
                fetched_at: Utc::now(),
            })
            .await?;

        debug!(url = %url, "Live fetch complete");
        Ok(Fetched {
            body: response.body,
            from_cache: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock transport that pops scripted responses; once the script is
    /// drained it keeps answering with the last scripted response.
    struct MockTransport {
        script: std::sync::Mutex<VecDeque<Result<TransportResponse, FetchError>>>,
        fallback: TransportResponse,
        calls: AtomicUsize,
    }

    impl MockTransport {
        fn ok(body: &str) -> Self {
            Self {
                script: std::sync::Mutex::new(VecDeque::new()),
                fallback: TransportResponse {
                    status: 200,
                    body: body.to_string(),
                },
                calls: AtomicUsize::new(0),
            }
        }

        fn scripted(script: Vec<Result<TransportResponse, FetchError>>) -> Self {
            Self {
                script: std::sync::Mutex::new(script.into()),
                fallback: TransportResponse {
                    status: 200,
                    body: "fallback".to_string(),
                },
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn execute(
            &self,
            _method: Method,
            _url: &Url,
            _form: Option<&[(String, String)]>,
        ) -> Result<TransportResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop_front() {
                Some(result) => result,
                None => Ok(self.fallback.clone()),
            }
        }
    }

    fn client(transport: Arc<MockTransport>, config: ClientConfig) -> WebClient {
        let cache = Arc::new(MemoryCache::new(chrono::Duration::hours(1)));
        WebClient::new(transport, cache, config).unwrap()
    }

    fn config() -> ClientConfig {
        ClientConfig::new("http://source.test").with_min_interval(Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_requests_hit_cache() {
        let transport = Arc::new(MockTransport::ok("<html>body</html>"));
        let client = client(transport.clone(), config());

        let first = client.get("/page", &[]).await.unwrap();
        let second = client.get("/page", &[]).await.unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.body, second.body);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_rate_limit() {
        let transport = Arc::new(MockTransport::ok("body"));
        let client = client(transport.clone(), config());

        client.get("/page", &[]).await.unwrap();

        // The cached call completes without advancing the paused clock.
        let start = Instant::now();
        let fetched = client.get("/page", &[]).await.unwrap();
        assert!(fetched.from_cache);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_params_are_distinct_requests() {
        let transport = Arc::new(MockTransport::ok("body"));
        let client = client(transport.clone(), config());

        client.get("/page", &[("from", "A")]).await.unwrap();
        client.get("/page", &[("from", "B")]).await.unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_requests_are_rate_limited() {
        let transport = Arc::new(MockTransport::ok("body"));
        let client = client(transport.clone(), config());

        let start = Instant::now();
        client.get("/a", &[]).await.unwrap();
        client.get("/b", &[]).await.unwrap();
        client.get("/c", &[]).await.unwrap();

        // N sequential live requests take at least (N - 1) * interval.
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_retries_with_backoff() {
        let transport = Arc::new(MockTransport::scripted(vec![
            Err(FetchError::transport("timeout")),
            Err(FetchError::transport("reset")),
            Ok(TransportResponse {
                status: 200,
                body: "recovered".to_string(),
            }),
        ]));
        let client = client(transport.clone(), config());

        let start = Instant::now();
        let fetched = client.get("/flaky", &[]).await.unwrap();

        assert_eq!(fetched.body, "recovered");
        assert_eq!(transport.calls(), 3);
        // Backoff schedule: 2^0 + 2^1 seconds between the attempts.
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_retries() {
        let transport = Arc::new(MockTransport::scripted(vec![Ok(TransportResponse {
            status: 503,
            body: "unavailable".to_string(),
        })]));
        let client = client(transport.clone(), config());

        let fetched = client.get("/busy", &[]).await.unwrap();
        assert_eq!(fetched.body, "fallback");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_is_not_retried() {
        let transport = Arc::new(MockTransport::scripted(vec![Ok(TransportResponse {
            status: 404,
            body: "missing".to_string(),
        })]));
        let client = client(transport.clone(), config());

        let err = client.get("/gone", &[]).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_aggregate_errors() {
        let transport = Arc::new(MockTransport::scripted(vec![
            Err(FetchError::transport("one")),
            Err(FetchError::transport("two")),
            Err(FetchError::transport("three")),
        ]));
        let client = client(
            transport.clone(),
            config().with_max_attempts(3),
        );

        let err = client.get("/down", &[]).await.unwrap_err();
        match err {
            FetchError::RetriesExhausted { attempts, errors } => {
                assert_eq!(attempts, 3);
                assert_eq!(errors.len(), 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_responses_are_not_cached() {
        let transport = Arc::new(MockTransport::scripted(vec![Ok(TransportResponse {
            status: 404,
            body: "missing".to_string(),
        })]));
        let client = client(transport.clone(), config());

        assert!(client.get("/gone", &[]).await.is_err());

        // The next call goes back to the network.
        let fetched = client.get("/gone", &[]).await.unwrap();
        assert!(!fetched.from_cache);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_is_a_distinct_request_identity() {
        let transport = Arc::new(MockTransport::ok("results"));
        let client = client(transport.clone(), config());

        let form = vec![("search".to_string(), "seinfeld".to_string())];
        let posted = client.post("/search", &[], Some(&form)).await.unwrap();
        assert!(!posted.from_cache);

        // The same URL via GET does not share the cache entry.
        client.get("/search", &[]).await.unwrap();
        assert_eq!(transport.calls(), 2);

        let again = client.post("/search", &[], Some(&form)).await.unwrap();
        assert!(again.from_cache);
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let transport = Arc::new(MockTransport::ok("body"));
        let cache = Arc::new(MemoryCache::new(chrono::Duration::hours(1)));
        let result = WebClient::new(transport, cache, ClientConfig::new("not a url"));
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_from_config_builds_transport_from_config() {
        let cache = Arc::new(MemoryCache::new(chrono::Duration::hours(1)));

        // The config's user agent and timeout are the only transport
        // inputs on this path.
        let client = WebClient::from_config(
            cache.clone(),
            ClientConfig::new("http://source.test")
                .with_user_agent("dramatis-test/1.0")
                .with_request_timeout(Duration::from_secs(5)),
        );
        assert!(client.is_ok());

        let result = WebClient::from_config(cache, ClientConfig::new("not a url"));
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
