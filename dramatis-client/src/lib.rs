//! # Dramatis Client
//!
//! Caching, rate-limited HTTP client used by the dramatis source
//! adapters.
//!
//! ## Architecture
//!
//! The crate is built around two seams:
//!
//! 1. **Transport** ([`HttpTransport`]): executes one prepared request
//!    against the network. Production uses [`ReqwestTransport`]; tests
//!    substitute mocks.
//! 2. **Cache** ([`CacheStore`]): persists responses keyed by the
//!    SHA-256 of (method, full URL). [`MemoryCache`] is ephemeral;
//!    [`SqliteCache`] outlives a run.
//!
//! [`WebClient`] combines the two with a per-instance minimum-interval
//! rate limit and exponential-backoff retries. Cache hits bypass the
//! rate limiter entirely; only live requests are metered.

pub mod cache;
pub mod client;
pub mod errors;
pub mod transport;

pub use cache::{request_key, CacheEntry, CacheStore, MemoryCache, SqliteCache};
pub use client::{ClientConfig, Fetched, WebClient};
pub use errors::FetchError;
pub use transport::{HttpTransport, Method, ReqwestTransport, TransportResponse};
