//! Platform people search

use super::{record_from_raw, QueryPass};
use crate::collector::fetcher::SourceFetcher;
use crate::collector::traits::Collector;
use crate::collector::types::{CollectRequest, Collection, CollectorError, SourceKind};
use crate::query::{Query, QueryIntent};
use crate::scoring::{SimilarityScorer, TokenJaccard};
use async_trait::async_trait;
use std::sync::Arc;

/// Searches one platform's people-search endpoint.
///
/// Confidence is the similarity between the searched name and the
/// profile's full name, optionally raised to a floor for platforms whose
/// search only returns fully resolved profiles.
pub struct PlatformSearchCollector {
    id: String,
    name: String,
    platform: String,
    fetcher: Arc<dyn SourceFetcher>,
    scorer: Arc<dyn SimilarityScorer>,
    max_queries: usize,
    confidence_floor: f64,
}

impl PlatformSearchCollector {
    pub fn new(platform: impl Into<String>, fetcher: Arc<dyn SourceFetcher>) -> Self {
        let platform = platform.into().to_lowercase();
        Self {
            id: format!("platform_search:{}", platform),
            name: format!("{} people search", platform),
            max_queries: default_query_cap(&platform),
            platform,
            fetcher,
            scorer: Arc::new(TokenJaccard),
            confidence_floor: 0.0,
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

    pub fn with_confidence_floor(mut self, floor: f64) -> Self {
        self.confidence_floor = floor;
        self
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }
}

/// Platforms that throttle search harder get fewer queries.
fn default_query_cap(platform: &str) -> usize {
    match platform {
        "twitter" | "x" => 2,
        _ => 3,
    }
}

#[async_trait]
impl Collector for PlatformSearchCollector {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Platform
    }

    fn accepts(&self, query: &Query) -> bool {
        matches!(
            query.intent(),
            QueryIntent::NameOnly | QueryIntent::NameLocation | QueryIntent::Context
        )
    }

    fn max_queries(&self) -> usize {
        self.max_queries
    }

    fn priority(&self) -> u32 {
        50
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Collection, CollectorError> {
        let mut pass = QueryPass::new(&self.id, &request.budget);

        for query in request.queries_matching(|q| self.accepts(q), self.max_queries) {
            if !pass.proceed() {
                break;
            }
            let found = pass
                .fetch(query.text(), self.fetcher.search_people(&self.platform, query.text()))
                .await?;

            for raw in found.unwrap_or_default() {
                if raw.handle.trim().is_empty() && raw.url.trim().is_empty() {
                    continue;
                }
                let similarity = self.scorer.score(&request.name, &raw.full_name);
                let confidence = similarity.max(self.confidence_floor);
                let record = record_from_raw(
                    &self.platform,
                    &self.id,
                    &raw,
                    confidence,
                    format!("{} search: {}", self.platform, query.text()),
                );
                pass.collection_mut().add_record(record);
            }
        }

        Ok(pass.finish())
    }
}
