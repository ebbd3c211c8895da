//! Direct profile probing by derived handle

use super::{record_from_raw, QueryPass};
use crate::collector::fetcher::SourceFetcher;
use crate::collector::traits::Collector;
use crate::collector::types::{CollectRequest, Collection, CollectorError, SourceKind};
use crate::query::{candidate_handles, NameTokens, Query};
use crate::scoring::{SimilarityScorer, TokenJaccard};
use async_trait::async_trait;
use std::sync::Arc;

/// Confidence given to an existing handle that spells the searched name.
const EXACT_HANDLE_FLOOR: f64 = 0.3;

/// Probes username patterns derived from the searched name.
///
/// This is the fallback for platforms whose search endpoint is blocked:
/// it does not consume generated queries, only the name itself.
pub struct HandleProbeCollector {
    id: String,
    name: String,
    platform: String,
    fetcher: Arc<dyn SourceFetcher>,
    scorer: Arc<dyn SimilarityScorer>,
    max_probes: usize,
}

impl HandleProbeCollector {
    pub fn new(platform: impl Into<String>, fetcher: Arc<dyn SourceFetcher>) -> Self {
        let platform = platform.into().to_lowercase();
        Self {
            id: format!("handle_probe:{}", platform),
            name: format!("{} handle probe", platform),
            platform,
            fetcher,
            scorer: Arc::new(TokenJaccard),
            max_probes: 10,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_max_probes(mut self, max_probes: usize) -> Self {
        self.max_probes = max_probes;
        self
    }

    fn confidence(&self, searched: &str, handle: &str, full_name: &str) -> f64 {
        let similarity = self.scorer.score(searched, full_name);
        let compact_handle: String = handle
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if compact_handle == NameTokens::parse(searched).compact() {
            similarity.max(EXACT_HANDLE_FLOOR)
        } else {
            similarity
        }
    }
}

#[async_trait]
impl Collector for HandleProbeCollector {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Platform
    }

    fn accepts(&self, _query: &Query) -> bool {
        false
    }

    fn priority(&self) -> u32 {
        150
    }

    async fn collect(&self, request: &CollectRequest) -> Result<Collection, CollectorError> {
        let mut pass = QueryPass::new(&self.id, &request.budget);
        let probes = self.max_probes.min(request.max_queries.max(1) * 2);

        for handle in candidate_handles(&request.name).into_iter().take(probes) {
            if !pass.proceed() {
                break;
            }
            let found = pass
                .fetch(&handle, self.fetcher.lookup_handle(&self.platform, &handle))
                .await?;

            if let Some(mut raw) = found.flatten() {
                if raw.handle.trim().is_empty() {
                    raw.handle = handle.clone();
                }
                let confidence = self.confidence(&request.name, &raw.handle, &raw.full_name);
                let record = record_from_raw(
                    &self.platform,
                    &self.id,
                    &raw,
                    confidence,
                    format!("handle probe: {}", handle),
                );
                pass.collection_mut().add_record(record);
            }
        }

        Ok(pass.finish())
    }
}
