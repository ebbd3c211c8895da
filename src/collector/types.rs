//! Core types for the collector contract

use super::cancel::CancellationToken;
use crate::query::Query;
use crate::scoring::clamp_unit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Broad category of information source a collector covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Platform people search or direct profile lookup
    Platform,
    /// General web search engines
    WebMention,
    /// Professional directories and business listings
    Directory,
    /// News and press
    News,
}

/// One hit returned by a single collector invocation.
///
/// Records are built once by the collector and never mutated afterwards;
/// the merge engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Information source (platform or directory name)
    pub source: String,
    /// Source-scoped identifier (handle, canonical URL); may be empty
    pub stable_key: String,
    /// Id of the collector that produced the record
    pub collector: String,
    pub display_name: String,
    pub bio: String,
    pub location: String,
    pub profile_url: String,
    pub image_url: String,
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
    pub verified: bool,
    pub private: bool,
    /// Explicit skills listed by the source
    pub skills: Vec<String>,
    /// Work history / role lines listed by the source
    pub roles: Vec<String>,
    /// Collector-assigned match confidence in [0, 1]
    pub raw_confidence: f64,
    /// Which query or method produced the record
    pub provenance: String,
    pub observed_at: DateTime<Utc>,
}

impl CandidateRecord {
    pub fn new(
        source: impl Into<String>,
        stable_key: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            stable_key: stable_key.into(),
            collector: String::new(),
            display_name: display_name.into(),
            bio: String::new(),
            location: String::new(),
            profile_url: String::new(),
            image_url: String::new(),
            followers: 0,
            following: 0,
            posts: 0,
            verified: false,
            private: false,
            skills: Vec::new(),
            roles: Vec::new(),
            raw_confidence: 0.0,
            provenance: String::new(),
            observed_at: Utc::now(),
        }
    }

    pub fn with_collector(mut self, collector: impl Into<String>) -> Self {
        self.collector = collector.into();
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.profile_url = url.into();
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    pub fn with_counts(mut self, followers: u64, following: u64, posts: u64) -> Self {
        self.followers = followers;
        self.following = following;
        self.posts = posts;
        self
    }

    pub fn with_flags(mut self, verified: bool, private: bool) -> Self {
        self.verified = verified;
        self.private = private;
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Set the match confidence, clamped into [0, 1]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.raw_confidence = clamp_unit(confidence);
        self
    }

    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }

    /// Whether the record can be merged with others sharing its key
    pub fn has_stable_key(&self) -> bool {
        !self.stable_key.trim().is_empty()
    }
}

/// How a web mention was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    Social,
    Professional,
    Article,
    Directory,
}

/// A web page mentioning the name that is not itself a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebMention {
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// Engine or outlet the mention came from
    pub source: String,
    pub date: Option<String>,
    pub kind: MentionKind,
    /// Fraction of the query present in title + snippet, in [0, 1]
    pub relevance: f64,
    pub provenance: String,
}

/// How one collector invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CollectorOutcome {
    /// Every query the collector chose to run was attempted
    Completed,
    /// The budget ran out (or the search deadline passed) first
    PartialTimeout,
    /// Structural failure; no records were kept
    Failed(String),
}

impl CollectorOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CollectorOutcome::Completed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CollectorOutcome::Failed(_))
    }
}

impl fmt::Display for CollectorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectorOutcome::Completed => f.write_str("completed"),
            CollectorOutcome::PartialTimeout => f.write_str("partial_timeout"),
            CollectorOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Everything a collector returns from a successful call
#[derive(Debug, Clone)]
pub struct Collection {
    pub records: Vec<CandidateRecord>,
    pub mentions: Vec<WebMention>,
    pub outcome: CollectorOutcome,
    /// Per-query failures that were recorded and skipped
    pub warnings: Vec<String>,
}

impl Collection {
    pub fn new(outcome: CollectorOutcome) -> Self {
        Self {
            records: Vec::new(),
            mentions: Vec::new(),
            outcome,
            warnings: Vec::new(),
        }
    }

    pub fn completed() -> Self {
        Self::new(CollectorOutcome::Completed)
    }

    pub fn add_record(&mut self, record: CandidateRecord) {
        self.records.push(record);
    }

    pub fn add_mention(&mut self, mention: WebMention) {
        self.mentions.push(mention);
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.mentions.is_empty()
    }
}

/// Time allowance handed to one collector at dispatch.
///
/// Collectors poll this between steps and stop issuing new requests once
/// it reports exhaustion.
#[derive(Debug, Clone)]
pub struct CollectBudget {
    started: Instant,
    allowance: Duration,
    cancel: CancellationToken,
}

impl CollectBudget {
    pub fn new(allowance: Duration, cancel: CancellationToken) -> Self {
        Self {
            started: Instant::now(),
            allowance,
            cancel,
        }
    }

    /// A budget nobody else can cancel
    pub fn standalone(allowance: Duration) -> Self {
        Self::new(allowance, CancellationToken::new())
    }

    pub fn allowance(&self) -> Duration {
        self.allowance
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.allowance.saturating_sub(self.elapsed())
    }

    /// True once the allowance is spent or the search was cancelled
    pub fn is_exhausted(&self) -> bool {
        self.cancel.is_cancelled() || self.elapsed() >= self.allowance
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Input to one collector invocation
#[derive(Debug, Clone)]
pub struct CollectRequest {
    /// The name being searched, as the caller typed it
    pub name: String,
    pub location: Option<String>,
    pub context: Option<String>,
    /// Every generated query, in generation order
    pub queries: Arc<[Query]>,
    /// Cap on how many queries this invocation may consume
    pub max_queries: usize,
    pub budget: CollectBudget,
}

impl CollectRequest {
    pub fn new(name: impl Into<String>, queries: Arc<[Query]>, budget: CollectBudget) -> Self {
        let max_queries = queries.len();
        Self {
            name: name.into(),
            location: None,
            context: None,
            queries,
            max_queries,
            budget,
        }
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries;
        self
    }

    /// Bounded prefix of the queries a collector accepts.
    ///
    /// `cap` is the collector's own limit; the request limit still applies.
    pub fn queries_matching<'a>(
        &'a self,
        accepts: impl Fn(&Query) -> bool + 'a,
        cap: usize,
    ) -> impl Iterator<Item = &'a Query> + 'a {
        self.queries
            .iter()
            .filter(move |q| accepts(*q))
            .take(cap.min(self.max_queries))
    }
}

/// Structural collector failure.
///
/// Converted to [`CollectorOutcome::Failed`] at the dispatch boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollectorError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{generate, QueryIntent};

    #[test]
    fn test_record_confidence_is_clamped() {
        let record = CandidateRecord::new("instagram", "jlee", "Jordan Lee").with_confidence(1.7);
        assert_eq!(record.raw_confidence, 1.0);
        let record = CandidateRecord::new("instagram", "jlee", "Jordan Lee").with_confidence(-3.0);
        assert_eq!(record.raw_confidence, 0.0);
    }

    #[test]
    fn test_record_stable_key() {
        assert!(CandidateRecord::new("web", "jlee", "").has_stable_key());
        assert!(!CandidateRecord::new("web", "  ", "").has_stable_key());
    }

    #[test]
    fn test_budget_exhaustion() {
        let budget = CollectBudget::standalone(Duration::ZERO);
        assert!(budget.is_exhausted());
        assert_eq!(budget.remaining(), Duration::ZERO);

        let budget = CollectBudget::standalone(Duration::from_secs(60));
        assert!(!budget.is_exhausted());
        budget.cancellation().cancel();
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_queries_matching_is_bounded() {
        let queries: Arc<[Query]> = generate("Jordan Lee", None, None).into();
        let request = CollectRequest::new(
            "Jordan Lee",
            queries,
            CollectBudget::standalone(Duration::from_secs(1)),
        )
        .with_max_queries(3);

        let social: Vec<_> = request
            .queries_matching(|q| q.intent() == QueryIntent::Social, 10)
            .collect();
        assert_eq!(social.len(), 3);
        assert!(social.iter().all(|q| q.intent() == QueryIntent::Social));

        let any: Vec<_> = request.queries_matching(|_| true, 2).collect();
        assert_eq!(any.len(), 2);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(CollectorOutcome::Completed.to_string(), "completed");
        assert_eq!(
            CollectorOutcome::Failed("down".into()).to_string(),
            "failed: down"
        );
    }
}
