//! Search pipeline: scheduling, merging and correlation
//!
//! # Architecture
//!
//! - **Scheduler**: Runs collectors concurrently under a global deadline
//! - **MergeEngine**: Deduplicates records into canonical profiles by identity key
//! - **Correlator**: Final ranking plus locations, skills, interests and roles
//! - **Finder**: The `search` operation tying the three together
//!
//! # Example
//!
//! ```ignore
//! use person_finder::search::Finder;
//! use person_finder::config::FinderConfig;
//!
//! let config = FinderConfig::load_or_default(None)?;
//! let registry = config.build_registry(fetcher);
//! let finder = Finder::new(registry, config.search.clone());
//!
//! let result = finder
//!     .search("Jordan Lee", Some("Austin"), None, config.search.global_deadline)
//!     .await;
//! println!("{} profiles, confidence {:.2}", result.profiles.len(), result.confidence());
//! ```

mod correlator;
mod finder;
mod merger;
mod scheduler;
mod types;

pub use correlator::{correlate, mean_confidence, rank};
pub use finder::Finder;
pub use merger::{merge, MergeEngine};
pub use scheduler::Scheduler;
pub use types::{
    AggregatedResult, CanonicalProfile, CollectorReport, DerivedAttributes, IdentityKey,
    SearchRequest,
};
