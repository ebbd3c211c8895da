//! Built-in collectors over a [`SourceFetcher`](super::SourceFetcher)
//!
//! Each fallback path of a source is its own collector: platform search
//! and direct handle probing for the same platform are registered side by
//! side and merged by identity key, never chained inside one collector.
//!
//! - **PlatformSearchCollector**: a platform's people search
//! - **HandleProbeCollector**: direct lookups of derived usernames
//! - **WebMentionCollector**: search engines; profile URLs become records,
//!   everything else becomes a web mention
//! - **DirectoryCollector**: professional directories
//! - **NewsCollector**: news and press mentions

mod directory;
mod handle_probe;
mod news;
mod platform;
mod web;

pub use directory::DirectoryCollector;
pub use handle_probe::HandleProbeCollector;
pub use news::NewsCollector;
pub use platform::PlatformSearchCollector;
pub use web::{profile_from_url, title_to_name, WebMentionCollector};

use super::fetcher::{FetchError, RawProfile};
use super::types::{CandidateRecord, CollectBudget, Collection, CollectorError, CollectorOutcome};
use std::future::Future;

/// Tracks one pass over a collector's queries.
///
/// Enforces the budget between steps, races each request against the
/// remaining allowance and search cancellation, records transient
/// failures, and turns a structural failure into `Err`.
pub(crate) struct QueryPass<'a> {
    collector: &'a str,
    budget: &'a CollectBudget,
    collection: Collection,
    timed_out: bool,
}

impl<'a> QueryPass<'a> {
    pub(crate) fn new(collector: &'a str, budget: &'a CollectBudget) -> Self {
        Self {
            collector,
            budget,
            collection: Collection::completed(),
            timed_out: false,
        }
    }

    /// Whether another request may be issued
    pub(crate) fn proceed(&mut self) -> bool {
        if self.budget.is_exhausted() {
            self.timed_out = true;
            return false;
        }
        true
    }

    /// Await one request within the remaining budget.
    ///
    /// `Ok(None)` means the step produced nothing usable and the pass
    /// should continue (or stop, if the budget is now spent).
    pub(crate) async fn fetch<T, F>(&mut self, label: &str, request: F) -> Result<Option<T>, CollectorError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        let remaining = self.budget.remaining();
        let cancel = self.budget.cancellation().clone();

        let outcome = tokio::select! {
            res = tokio::time::timeout(remaining, request) => res,
            _ = cancel.cancelled() => {
                self.timed_out = true;
                return Ok(None);
            }
        };

        match outcome {
            Ok(Ok(value)) => Ok(Some(value)),
            Ok(Err(err)) if err.is_structural() => Err(CollectorError::Unavailable(err.to_string())),
            Ok(Err(err)) => {
                tracing::debug!(collector = self.collector, step = label, error = %err, "request failed");
                self.collection.add_warning(format!("{}: {}", label, err));
                Ok(None)
            }
            Err(_) => {
                self.timed_out = true;
                Ok(None)
            }
        }
    }

    pub(crate) fn collection_mut(&mut self) -> &mut Collection {
        &mut self.collection
    }

    pub(crate) fn finish(mut self) -> Collection {
        if self.timed_out {
            self.collection.outcome = CollectorOutcome::PartialTimeout;
        }
        self.collection
    }
}

/// Canonical form of a profile URL for use as a stable key
pub(crate) fn canonical_url(url: &str) -> String {
    let url = url.trim().to_lowercase();
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(&url);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    let without_query = without_www
        .split(['?', '#'])
        .next()
        .unwrap_or(without_www);
    without_query.trim_end_matches('/').to_string()
}

/// Source-scoped stable key: the handle when known, else the canonical URL
pub(crate) fn stable_key_for(raw: &RawProfile) -> String {
    let handle = raw.handle.trim().trim_start_matches('@').to_lowercase();
    if !handle.is_empty() {
        handle
    } else if !raw.url.trim().is_empty() {
        canonical_url(&raw.url)
    } else {
        String::new()
    }
}

/// Build a candidate record from a raw profile
pub(crate) fn record_from_raw(
    source: &str,
    collector: &str,
    raw: &RawProfile,
    confidence: f64,
    provenance: impl Into<String>,
) -> CandidateRecord {
    let display_name = if raw.full_name.trim().is_empty() {
        raw.handle.trim().to_string()
    } else {
        raw.full_name.trim().to_string()
    };

    CandidateRecord::new(source, stable_key_for(raw), display_name)
        .with_collector(collector)
        .with_bio(raw.bio.trim())
        .with_location(raw.location.trim())
        .with_profile_url(raw.url.trim())
        .with_image_url(raw.image_url.trim())
        .with_counts(raw.followers, raw.following, raw.posts)
        .with_flags(raw.verified, raw.private)
        .with_skills(raw.skills.clone())
        .with_roles(raw.roles.clone())
        .with_confidence(confidence)
        .with_provenance(provenance)
}
