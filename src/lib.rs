//! Person Finder: concurrent multi-source person search
//!
//! Searches for a named individual across many independent, slow and
//! partially failing sources, then merges everything into one ranked,
//! deduplicated profile set within a bounded time budget.
//!
//! # Core Concepts
//!
//! - **Queries**: Deterministic name, location and role variants
//! - **Collectors**: One per information source, run concurrently over an injected fetcher
//! - **Canonical profiles**: Records merged by `(source, stable key)` with max-evidence confidence
//! - **Aggregated result**: Ranked profiles, web mentions, derived attributes and per-collector outcomes
//!
//! # Example
//!
//! ```no_run
//! use person_finder::{CollectorRegistry, Finder, SearchConfig};
//! use std::time::Duration;
//!
//! # async fn run() {
//! let finder = Finder::new(CollectorRegistry::new(), SearchConfig::default());
//! let result = finder
//!     .search("Jordan Lee", None, None, Duration::from_secs(10))
//!     .await;
//! assert!(result.profiles.is_empty());
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod query;
pub mod scoring;
pub mod search;

pub use collector::{
    CandidateRecord, Collector, CollectorError, CollectorOutcome, CollectorRegistry, FetchError,
    FixtureFetcher, SourceFetcher, UnavailableFetcher, WebMention,
};
pub use config::{CollectorSpec, ConfigError, FinderConfig, SearchConfig};
pub use query::{generate, Query, QueryGenerationError, QueryIntent};
pub use scoring::{SimilarityScorer, TokenJaccard};
pub use search::{AggregatedResult, CanonicalProfile, CollectorReport, DerivedAttributes, Finder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
