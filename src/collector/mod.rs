//! Collectors: the per-source half of a person search
//!
//! A collector queries one information source with the generated queries
//! and returns candidate records (and, for web sources, mentions). The
//! scheduler runs every registered collector concurrently; collectors never
//! see each other.
//!
//! # Architecture
//!
//! - **Collector trait**: Interface every source implements
//! - **CollectorRegistry**: The set of collectors a search dispatches to
//! - **SourceFetcher**: Injected I/O capability collectors run on
//! - **CollectBudget**: Shrinking time allowance plus search-wide cancellation
//!
//! # Built-in Collectors
//!
//! See [`sources`]. [`FixtureFetcher`] replays canned responses so the
//! built-ins can run offline.
//!
//! # Example
//!
//! ```ignore
//! use person_finder::collector::{CollectorRegistry, FixtureFetcher};
//! use person_finder::collector::sources::PlatformSearchCollector;
//!
//! let fetcher = Arc::new(FixtureFetcher::from_path(path)?);
//! let mut registry = CollectorRegistry::new();
//! registry.register(PlatformSearchCollector::new("instagram", fetcher.clone()));
//! ```

mod cancel;
mod fetcher;
pub mod fixture;
pub mod sources;
mod traits;
mod types;

pub use cancel::CancellationToken;
pub use fetcher::{FetchError, RawProfile, SearchHit, SourceFetcher, UnavailableFetcher};
pub use fixture::{FixtureError, FixtureFetcher, Fixtures};
pub use traits::{Collector, CollectorRegistry};
pub use types::{
    CandidateRecord, CollectBudget, CollectRequest, Collection, CollectorError, CollectorOutcome,
    MentionKind, SourceKind, WebMention,
};
