//! Cross-profile correlation
//!
//! Pure functions over the frozen profile set: the final ranking and the
//! attributes derived from every profile together. Keyword extraction is a
//! whole-word membership test against fixed lists.

use super::types::{CanonicalProfile, DerivedAttributes};
use crate::scoring::clamp_unit;
use std::cmp::Ordering;
use std::collections::BTreeSet;

const INTEREST_KEYWORDS: &[&str] = &[
    "love",
    "passion",
    "enjoy",
    "hobby",
    "interest",
    "fan of",
    "music",
    "sports",
    "travel",
    "photography",
    "cooking",
    "reading",
    "fitness",
    "yoga",
    "meditation",
    "art",
    "design",
    "technology",
];

const SKILL_KEYWORDS: &[&str] = &[
    "python",
    "rust",
    "javascript",
    "java",
    "sql",
    "machine learning",
    "data analysis",
    "data science",
    "marketing",
    "sales",
    "accounting",
    "finance",
    "project management",
    "leadership",
    "public speaking",
    "writing",
    "editing",
    "ux",
    "cloud",
    "devops",
];

const ROLE_KEYWORDS: &[&str] = &[
    "ceo",
    "cto",
    "cfo",
    "founder",
    "co-founder",
    "director",
    "manager",
    "engineer",
    "developer",
    "designer",
    "consultant",
    "analyst",
    "professor",
    "researcher",
    "photographer",
    "writer",
    "owner",
    "president",
];

/// Final ordering: confidence descending, then source, stable key and
/// every remaining content field, so identical sets always come out in the
/// same order even when keyless profiles share a source and name.
/// Profiles below `threshold` are dropped.
pub fn rank(mut profiles: Vec<CanonicalProfile>, threshold: f64) -> Vec<CanonicalProfile> {
    profiles.retain(|p| p.confidence >= threshold);
    profiles.sort_by(rank_order);
    profiles
}

fn rank_order(a: &CanonicalProfile, b: &CanonicalProfile) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.stable_key.cmp(&b.stable_key))
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.profile_url.cmp(&b.profile_url))
        .then_with(|| a.bio.cmp(&b.bio))
        .then_with(|| a.location.cmp(&b.location))
        .then_with(|| a.image_url.cmp(&b.image_url))
        .then_with(|| b.followers.cmp(&a.followers))
        .then_with(|| b.following.cmp(&a.following))
        .then_with(|| b.posts.cmp(&a.posts))
        .then_with(|| a.verified.cmp(&b.verified))
        .then_with(|| a.private.cmp(&b.private))
        .then_with(|| a.skills.cmp(&b.skills))
        .then_with(|| a.roles.cmp(&b.roles))
        .then_with(|| a.collectors.cmp(&b.collectors))
        .then_with(|| b.evidence.cmp(&a.evidence))
        .then_with(|| a.first_seen.cmp(&b.first_seen))
        .then_with(|| a.provenance.cmp(&b.provenance))
}

/// Derive aggregate attributes from a profile set
pub fn correlate(profiles: &[CanonicalProfile]) -> DerivedAttributes {
    let mut derived = DerivedAttributes::default();

    for profile in profiles {
        let location = profile.location.trim();
        if !location.is_empty() {
            derived.locations.insert(location.to_string());
        }

        derived.skills.extend(profile.skills.iter().cloned());
        derived.roles.extend(profile.roles.iter().cloned());

        if profile.bio.trim().is_empty() {
            continue;
        }
        let words = word_text(&profile.bio);
        derived.skills.extend(keywords_in(&words, SKILL_KEYWORDS));
        derived.interests.extend(keywords_in(&words, INTEREST_KEYWORDS));
        derived.roles.extend(keywords_in(&words, ROLE_KEYWORDS));
    }

    derived.confidence = mean_confidence(profiles);
    derived
}

/// Arithmetic mean of profile confidences; 0 for no profiles
pub fn mean_confidence(profiles: &[CanonicalProfile]) -> f64 {
    if profiles.is_empty() {
        return 0.0;
    }
    let total: f64 = profiles.iter().map(|p| p.confidence).sum();
    clamp_unit(total / profiles.len() as f64)
}

/// Lowercase words separated and surrounded by single spaces.
///
/// Hyphens stay inside words so `co-founder` matches as one keyword.
fn word_text(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    format!(" {} ", words.join(" "))
}

fn keywords_in(words: &str, keywords: &[&str]) -> BTreeSet<String> {
    keywords
        .iter()
        .filter(|kw| words.contains(&format!(" {} ", kw)))
        .map(|kw| kw.to_string())
        .collect()
}
