//! # Dramatis Resolver
//!
//! Deterministic fuzzy resolution of noisy script mentions onto the
//! canonical cast.
//!
//! ## Architecture
//!
//! Resolution is a pure pipeline over prebuilt, read-only indices:
//!
//! 1. **Mention hygiene** ([`mention`]): split joined speaker credits
//!    into individual mentions.
//! 2. **Parsing** ([`name`]): normalize a raw mention into structured
//!    parts (title/first/middle/last/suffix).
//! 3. **Scoring** ([`similarity`]): continuous similarity between two
//!    structured names, with a phonetic boost.
//! 4. **Resolution** ([`resolve`]): an ordered sequence of strategies
//!    (denylist, exact, alias, unique single token, fuzzy ranking)
//!    tried in order, short-circuiting on the first verdict.
//!
//! The resolver is built once, single-threaded, and is safe for
//! unsynchronized concurrent calls afterwards.

pub mod errors;
pub mod mention;
pub mod name;
pub mod resolve;
pub mod similarity;

pub use errors::ResolverError;
pub use mention::split_speakers;
pub use name::StructuredName;
pub use resolve::{Resolution, Resolver};
pub use similarity::PHONETIC_BONUS;
