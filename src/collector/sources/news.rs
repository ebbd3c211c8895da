//! News and press mentions

use super::QueryPass;
use crate::collector::fetcher::SourceFetcher;
use crate::collector::traits::Collector;
use crate::collector::types::{
    CollectRequest, Collection, CollectorError, MentionKind, SourceKind, WebMention,
};
use crate::query::{Query, QueryIntent};
use crate::scoring::mention_relevance;
use async_trait::async_trait;
use std::sync::Arc;

const NEWS_SOURCE: &str = "news";

/// Searches news outlets and press releases. Produces mentions only.
pub struct NewsCollector {
    fetcher: Arc<dyn SourceFetcher>,
    max_queries: usize,
}

impl NewsCollector {
    pub fn new(fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            fetcher,
            max_queries: 3,
        }
    }

    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries;
        self
    }
}

#[async_trait]
impl Collector for NewsCollector {
    fn id(&self) -> &str {
        NEWS_SOURCE
    }

    fn name(&self) -> &str {
        "News and press"
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::News
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
        200
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Collection, CollectorError> {
        let mut pass = QueryPass::new(NEWS_SOURCE, &request.budget);

        for query in request.queries_matching(|q| self.accepts(q), self.max_queries) {
            if !pass.proceed() {
                break;
            }
            let hits = pass
                .fetch(query.text(), self.fetcher.news_search(query.text()))
                .await?;

            for hit in hits.unwrap_or_default() {
                if hit.url.trim().is_empty() {
                    continue;
                }
                let relevance = mention_relevance(query.text(), &hit.title, &hit.snippet);
                pass.collection_mut().add_mention(WebMention {
                    url: hit.url.trim().to_string(),
                    title: hit.title.trim().to_string(),
                    snippet: hit.snippet.trim().to_string(),
                    source: NEWS_SOURCE.to_string(),
                    date: hit.date,
                    kind: MentionKind::Article,
                    relevance,
                    provenance: format!("news search: {}", query.text()),
                });
            }
        }

        Ok(pass.finish())
    }
}
