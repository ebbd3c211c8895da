//! Search-engine mentions

use super::{canonical_url, QueryPass};
use crate::collector::fetcher::{SearchHit, SourceFetcher};
use crate::collector::traits::Collector;
use crate::collector::types::{
    CandidateRecord, CollectRequest, Collection, CollectorError, SourceKind, WebMention,
};
use crate::scoring::{classify_mention, mention_relevance, SimilarityScorer, TokenJaccard};
use async_trait::async_trait;
use std::sync::Arc;

/// Path segments that are never profile handles
const RESERVED_SEGMENTS: &[&str] = &[
    "search", "explore", "hashtag", "p", "reel", "pages", "home", "login", "share", "intent",
    "i", "status", "groups", "events", "watch", "about", "company", "jobs", "orgs", "topics",
];

/// Runs the generated queries through one search engine.
///
/// Results that point at a known profile URL become candidate records on
/// that platform; all other results become web mentions.
pub struct WebMentionCollector {
    id: String,
    name: String,
    engine: String,
    fetcher: Arc<dyn SourceFetcher>,
    scorer: Arc<dyn SimilarityScorer>,
    max_queries: usize,
}

impl WebMentionCollector {
    pub fn new(engine: impl Into<String>, fetcher: Arc<dyn SourceFetcher>) -> Self {
        let engine = engine.into().to_lowercase();
        Self {
            id: format!("web_mentions:{}", engine),
            name: format!("{} web mentions", engine),
            engine,
            fetcher,
            scorer: Arc::new(TokenJaccard),
            max_queries: 5,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries;
        self
    }

    fn absorb(&self, collection: &mut Collection, searched: &str, query: &str, hit: SearchHit) {
        if !is_web_url(&hit.url) {
            return;
        }
        let provenance = format!("{} search: {}", self.engine, query);

        if let Some((platform, handle)) = profile_from_url(&hit.url) {
            let display_name = title_to_name(&hit.title);
            let confidence = self.scorer.score(searched, &display_name);
            let record = CandidateRecord::new(platform, handle, display_name)
                .with_collector(&self.id)
                .with_bio(hit.snippet.trim())
                .with_profile_url(hit.url.trim())
                .with_confidence(confidence)
                .with_provenance(provenance);
            collection.add_record(record);
        } else {
            let relevance = mention_relevance(query, &hit.title, &hit.snippet);
            let kind = classify_mention(&hit.url, &hit.title, &hit.snippet);
            collection.add_mention(WebMention {
                url: hit.url.trim().to_string(),
                title: hit.title.trim().to_string(),
                snippet: hit.snippet.trim().to_string(),
                source: self.engine.clone(),
                date: hit.date,
                kind,
                relevance,
                provenance,
            });
        }
    }
}

#[async_trait]
impl Collector for WebMentionCollector {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::WebMention
    }

    fn max_queries(&self) -> usize {
        self.max_queries
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Collection, CollectorError> {
        let mut pass = QueryPass::new(&self.id, &request.budget);

        for query in request.queries_matching(|q| self.accepts(q), self.max_queries) {
            if !pass.proceed() {
                break;
            }
            let hits = pass
                .fetch(query.text(), self.fetcher.web_search(&self.engine, query.text()))
                .await?;

            for hit in hits.unwrap_or_default() {
                self.absorb(pass.collection_mut(), &request.name, query.text(), hit);
            }
        }

        Ok(pass.finish())
    }
}

/// Absolute http(s) URL, scheme compared case-insensitively
fn is_web_url(url: &str) -> bool {
    let url = url.trim();
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Recognize a social profile URL, returning `(platform, handle)`.
pub fn profile_from_url(url: &str) -> Option<(&'static str, String)> {
    let canonical = canonical_url(url);
    let canonical = canonical.strip_prefix("m.").unwrap_or(&canonical);
    let (host, path) = canonical.split_once('/')?;
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    let (platform, handle) = match host {
        "instagram.com" => ("instagram", segments.next()?),
        "twitter.com" | "x.com" => ("twitter", segments.next()?),
        "facebook.com" => ("facebook", segments.next()?),
        "github.com" => ("github", segments.next()?),
        "linkedin.com" => match segments.next()? {
            "in" => ("linkedin", segments.next()?),
            _ => return None,
        },
        _ => return None,
    };

    let handle = handle.trim_start_matches('@');
    if handle.is_empty() || RESERVED_SEGMENTS.contains(&handle) {
        return None;
    }
    Some((platform, handle.to_string()))
}

/// Derive a display name from a result title (`"Jordan Lee - Engineer | LinkedIn"`).
pub fn title_to_name(title: &str) -> String {
    let title = title.trim();
    let cut = [" - ", " | ", " (", " • ", " on "]
        .iter()
        .filter_map(|sep| title.find(sep))
        .min()
        .unwrap_or(title.len());
    title[..cut].trim().to_string()
}
