//! Confidence and relevance scoring
//!
//! Every collector scores name matches through the same pluggable
//! [`SimilarityScorer`], so confidence means the same thing whichever
//! source produced a record. The default is token-set Jaccard similarity.

use crate::collector::MentionKind;
use std::collections::HashSet;
use std::fmt;

/// Pluggable name-similarity function.
///
/// Implementations must return a value in [0, 1] and be symmetric in
/// practice; collectors call it as `score(searched_name, found_name)`.
pub trait SimilarityScorer: Send + Sync + fmt::Debug {
    fn score(&self, searched: &str, found: &str) -> f64;
}

/// Default: intersection-over-union of lowercase token sets.
///
/// `J(A, B) = |A ∩ B| / |A ∪ B|`, 0 when either set is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl SimilarityScorer for TokenJaccard {
    fn score(&self, searched: &str, found: &str) -> f64 {
        name_similarity(searched, found)
    }
}

/// Token-set Jaccard similarity between two names.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = token_set(a);
    let b = token_set(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f64 / union as f64
}

/// Lowercase whitespace-split tokens with surrounding punctuation trimmed.
fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Fraction of the query's words that appear in a mention's title or snippet.
///
/// Boolean operators (`OR`, `AND`) and quoting are ignored.
pub fn mention_relevance(query: &str, title: &str, snippet: &str) -> f64 {
    let haystack = format!("{} {}", title, snippet).to_lowercase();
    let words: Vec<String> = query
        .split_whitespace()
        .filter(|w| *w != "OR" && *w != "AND")
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return 0.0;
    }
    let hits = words.iter().filter(|w| haystack.contains(w.as_str())).count();
    hits as f64 / words.len() as f64
}

const SOCIAL_HOSTS: &[&str] = &[
    "linkedin.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "//x.com",
    "github.com",
];
const PROFESSIONAL_WORDS: &[&str] = &["ceo", "founder", "director", "company", "business"];
const ARTICLE_MARKERS: &[&str] = &["news", "article", "press", "media"];

/// Classify a mention from its URL and text.
pub fn classify_mention(url: &str, title: &str, snippet: &str) -> MentionKind {
    let url = url.to_lowercase();
    let text = format!("{} {}", title, snippet).to_lowercase();

    if SOCIAL_HOSTS.iter().any(|h| url.contains(h)) {
        MentionKind::Social
    } else if PROFESSIONAL_WORDS.iter().any(|w| text.contains(w)) {
        MentionKind::Professional
    } else if ARTICLE_MARKERS.iter().any(|m| url.contains(m)) {
        MentionKind::Article
    } else {
        MentionKind::Directory
    }
}

/// Clamp a score into [0, 1], mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
