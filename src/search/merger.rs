//! Identity and merge engine
//!
//! Deduplicates candidate records into canonical profiles keyed by
//! [`IdentityKey`]. Collectors finish in any order, so every merge rule is
//! commutative and associative: the final profile set does not depend on
//! arrival order (only `provenance` may differ).
//!
//! Field rules:
//! - text fields: an empty value never overwrites; between two non-empty
//!   values the one from the higher-confidence record wins, ties broken by
//!   the lexicographically smaller value
//! - counts: maximum observed
//! - `verified` / `private`: set if any record sets them
//! - skills, roles, contributing collectors: union
//! - confidence: maximum `raw_confidence`

use super::types::{CanonicalProfile, FieldWeights, IdentityKey};
use crate::collector::sources::canonical_url;
use crate::collector::{CandidateRecord, WebMention};
use crate::scoring::clamp_unit;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Single writer for canonical profiles.
///
/// Ingestion may be called from several tasks at once; the map serializes
/// every read-modify-write per identity key.
#[derive(Debug, Default)]
pub struct MergeEngine {
    profiles: DashMap<IdentityKey, CanonicalProfile>,
    mentions: DashMap<String, WebMention>,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one record into the profile for its key, creating it if new
    pub fn ingest(&self, record: &CandidateRecord) {
        let key = IdentityKey::for_record(record);
        self.profiles
            .entry(key.clone())
            .and_modify(|profile| profile.absorb(record))
            .or_insert_with(|| CanonicalProfile::seed(key, record));
    }

    pub fn ingest_all<'a>(&self, records: impl IntoIterator<Item = &'a CandidateRecord>) {
        for record in records {
            self.ingest(record);
        }
    }

    /// Add a mention, keeping the most relevant copy per URL
    pub fn ingest_mention(&self, mention: WebMention) {
        let key = canonical_url(&mention.url);
        if key.is_empty() {
            return;
        }
        self.mentions
            .entry(key)
            .and_modify(|existing| {
                if mention_precedes(&mention, existing) {
                    *existing = mention.clone();
                }
            })
            .or_insert(mention);
    }

    /// Number of distinct profiles so far
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn mention_count(&self) -> usize {
        self.mentions.len()
    }

    /// Stop merging and hand out the profile set and the sorted mentions
    pub fn freeze(self) -> (Vec<CanonicalProfile>, Vec<WebMention>) {
        let profiles = self.profiles.into_iter().map(|(_, p)| p).collect();
        let mut mentions: Vec<WebMention> = self.mentions.into_iter().map(|(_, m)| m).collect();
        mentions.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| a.url.cmp(&b.url))
        });
        (profiles, mentions)
    }
}

/// Merge a batch of records in one call
pub fn merge<'a>(records: impl IntoIterator<Item = &'a CandidateRecord>) -> Vec<CanonicalProfile> {
    let engine = MergeEngine::new();
    engine.ingest_all(records);
    engine.freeze().0
}

/// Higher relevance wins; equal relevance falls back to content so the
/// survivor does not depend on arrival order
fn mention_precedes(candidate: &WebMention, existing: &WebMention) -> bool {
    match candidate.relevance.total_cmp(&existing.relevance) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            (&candidate.title, &candidate.source, &candidate.url)
                < (&existing.title, &existing.source, &existing.url)
        }
    }
}

/// Take `candidate` into `current` if it outranks what is there
fn take_text(current: &mut String, weight: &mut f64, candidate: &str, candidate_weight: f64) {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return;
    }
    let wins = current.is_empty()
        || match candidate_weight.total_cmp(weight) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => candidate < current.as_str(),
        };
    if wins {
        *current = candidate.to_string();
        *weight = candidate_weight;
    }
}

fn non_empty_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

impl CanonicalProfile {
    /// Create the profile for a key from its first record
    pub(crate) fn seed(key: IdentityKey, record: &CandidateRecord) -> Self {
        let mut profile = Self {
            key,
            source: record.source.trim().to_lowercase(),
            stable_key: record.stable_key.trim().to_string(),
            display_name: String::new(),
            bio: String::new(),
            location: String::new(),
            profile_url: String::new(),
            image_url: String::new(),
            followers: 0,
            following: 0,
            posts: 0,
            verified: false,
            private: false,
            skills: BTreeSet::new(),
            roles: BTreeSet::new(),
            confidence: 0.0,
            provenance: String::new(),
            collectors: BTreeSet::new(),
            evidence: 0,
            first_seen: record.observed_at,
            weights: FieldWeights::default(),
        };
        profile.absorb(record);
        profile
    }

    /// Fold a duplicate record into the profile
    pub(crate) fn absorb(&mut self, record: &CandidateRecord) {
        let weight = clamp_unit(record.raw_confidence);
        let w = &mut self.weights;

        take_text(&mut self.display_name, &mut w.display_name, &record.display_name, weight);
        take_text(&mut self.bio, &mut w.bio, &record.bio, weight);
        take_text(&mut self.location, &mut w.location, &record.location, weight);
        take_text(&mut self.profile_url, &mut w.profile_url, &record.profile_url, weight);
        take_text(&mut self.image_url, &mut w.image_url, &record.image_url, weight);

        self.followers = self.followers.max(record.followers);
        self.following = self.following.max(record.following);
        self.posts = self.posts.max(record.posts);
        self.verified |= record.verified;
        self.private |= record.private;

        self.skills.extend(non_empty_set(&record.skills));
        self.roles.extend(non_empty_set(&record.roles));
        if !record.collector.is_empty() {
            self.collectors.insert(record.collector.clone());
        }

        self.confidence = self.confidence.max(weight);
        if self.provenance.is_empty() {
            self.provenance = record.provenance.clone();
        }
        self.first_seen = self.first_seen.min(record.observed_at);
        self.evidence += 1;
    }
}
