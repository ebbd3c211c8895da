//! Professional directories and business listings

use super::{record_from_raw, QueryPass};
use crate::collector::fetcher::SourceFetcher;
use crate::collector::traits::Collector;
use crate::collector::types::{CollectRequest, Collection, CollectorError, SourceKind};
use crate::query::{Query, QueryIntent};
use crate::scoring::{SimilarityScorer, TokenJaccard};
use async_trait::async_trait;
use std::sync::Arc;

const DIRECTORY_SOURCE: &str = "directory";

/// Searches directory listings for people with the searched name.
pub struct DirectoryCollector {
    fetcher: Arc<dyn SourceFetcher>,
    scorer: Arc<dyn SimilarityScorer>,
    max_queries: usize,
}

impl DirectoryCollector {
    pub fn new(fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            fetcher,
            scorer: Arc::new(TokenJaccard),
            max_queries: 3,
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
}

#[async_trait]
impl Collector for DirectoryCollector {
    fn id(&self) -> &str {
        DIRECTORY_SOURCE
    }

    fn name(&self) -> &str {
        "Directory listings"
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Directory
    }

    fn accepts(&self, query: &Query) -> bool {
        !matches!(query.intent(), QueryIntent::Social)
    }

    fn max_queries(&self) -> usize {
        self.max_queries
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Collection, CollectorError> {
        let mut pass = QueryPass::new(DIRECTORY_SOURCE, &request.budget);

        for query in request.queries_matching(|q| self.accepts(q), self.max_queries) {
            if !pass.proceed() {
                break;
            }
            let found = pass
                .fetch(query.text(), self.fetcher.directory_search(query.text()))
                .await?;

            for raw in found.unwrap_or_default() {
                let confidence = self.scorer.score(&request.name, &raw.full_name);
                let record = record_from_raw(
                    DIRECTORY_SOURCE,
                    DIRECTORY_SOURCE,
                    &raw,
                    confidence,
                    format!("directory search: {}", query.text()),
                );
                pass.collection_mut().add_record(record);
            }
        }

        Ok(pass.finish())
    }
}
