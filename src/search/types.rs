//! Types produced by a search

use crate::collector::{CandidateRecord, CollectorOutcome, WebMention};
use crate::query::Query;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Decides which candidate records describe the same profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdentityKey {
    /// `(source, stable_key)` for records that resolved an identifier
    Keyed { source: String, stable_key: String },
    /// A record without a stable key; never merged with anything
    Singleton { id: Uuid },
}

impl IdentityKey {
    pub fn for_record(record: &CandidateRecord) -> Self {
        if record.has_stable_key() {
            IdentityKey::Keyed {
                source: record.source.trim().to_lowercase(),
                stable_key: record.stable_key.trim().to_string(),
            }
        } else {
            IdentityKey::Singleton { id: Uuid::new_v4() }
        }
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self, IdentityKey::Singleton { .. })
    }
}

/// Confidence of the record each text field was taken from
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FieldWeights {
    pub display_name: f64,
    pub bio: f64,
    pub location: f64,
    pub profile_url: f64,
    pub image_url: f64,
}

/// Merged representative of every record sharing one identity key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProfile {
    pub key: IdentityKey,
    pub source: String,
    pub stable_key: String,
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
    pub skills: BTreeSet<String>,
    pub roles: BTreeSet<String>,
    /// Best `raw_confidence` among the constituent records
    pub confidence: f64,
    /// Provenance of the first record seen for this key
    pub provenance: String,
    /// Collectors that contributed records
    pub collectors: BTreeSet<String>,
    /// Number of records merged into this profile
    pub evidence: usize,
    /// Earliest observation among the constituent records
    pub first_seen: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) weights: FieldWeights,
}

/// Attributes derived across the whole profile set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedAttributes {
    pub locations: BTreeSet<String>,
    pub skills: BTreeSet<String>,
    pub interests: BTreeSet<String>,
    /// Professional facts: listed roles plus role titles found in bios
    pub roles: BTreeSet<String>,
    /// Mean profile confidence, 0 for an empty set
    pub confidence: f64,
}

/// How one collector fared in a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorReport {
    pub collector: String,
    pub outcome: CollectorOutcome,
    /// Records forwarded to the merge engine
    pub records: usize,
    pub mentions: usize,
    pub warnings: Vec<String>,
    pub elapsed_ms: u64,
    /// False when the deadline passed before a concurrency slot freed up
    pub admitted: bool,
}

impl CollectorReport {
    pub(crate) fn new(collector: impl Into<String>, outcome: CollectorOutcome) -> Self {
        Self {
            collector: collector.into(),
            outcome,
            records: 0,
            mentions: 0,
            warnings: Vec::new(),
            elapsed_ms: 0,
            admitted: true,
        }
    }
}

/// The inputs one search hands to the scheduler
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub name: String,
    pub location: Option<String>,
    pub context: Option<String>,
    pub queries: Arc<[Query]>,
}

impl SearchRequest {
    pub fn new(name: impl Into<String>, queries: Arc<[Query]>) -> Self {
        Self {
            name: name.into(),
            location: None,
            context: None,
            queries,
        }
    }

    pub fn with_location(mut self, location: Option<&str>) -> Self {
        self.location = location.map(str::to_string);
        self
    }

    pub fn with_context(mut self, context: Option<&str>) -> Self {
        self.context = context.map(str::to_string);
        self
    }
}

/// The finished answer to one search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub search_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub context: Option<String>,
    pub started_at: DateTime<Utc>,
    pub queries: Vec<Query>,
    /// Sorted by confidence, highest first
    pub profiles: Vec<CanonicalProfile>,
    /// Sorted by relevance, highest first
    pub mentions: Vec<WebMention>,
    #[serde(flatten)]
    pub attributes: DerivedAttributes,
    pub elapsed_ms: u64,
    pub collectors: Vec<CollectorReport>,
}

impl AggregatedResult {
    /// Result for a search that never ran
    pub fn empty(name: &str, location: Option<&str>, context: Option<&str>) -> Self {
        Self {
            search_id: Uuid::new_v4(),
            name: name.trim().to_string(),
            location: location.map(str::to_string),
            context: context.map(str::to_string),
            started_at: Utc::now(),
            queries: Vec::new(),
            profiles: Vec::new(),
            mentions: Vec::new(),
            attributes: DerivedAttributes::default(),
            elapsed_ms: 0,
            collectors: Vec::new(),
        }
    }

    /// Overall confidence that the profiles describe the searched person
    pub fn confidence(&self) -> f64 {
        self.attributes.confidence
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty() && self.mentions.is_empty()
    }

    pub fn report(&self, collector: &str) -> Option<&CollectorReport> {
        self.collectors.iter().find(|r| r.collector == collector)
    }

    pub fn failed_collectors(&self) -> impl Iterator<Item = &CollectorReport> {
        self.collectors.iter().filter(|r| r.outcome.is_failed())
    }
}
