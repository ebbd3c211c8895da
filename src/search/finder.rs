//! The `search` operation
//!
//! Wires the pipeline together: generate queries, fan out to every
//! registered collector, merge, rank and correlate.

use super::correlator::{correlate, rank};
use super::merger::MergeEngine;
use super::scheduler::Scheduler;
use super::types::{AggregatedResult, SearchRequest};
use crate::collector::CollectorRegistry;
use crate::config::SearchConfig;
use crate::query::{try_generate, Query, QueryGenerationError};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Person search over a fixed set of collectors and configuration.
///
/// A `Finder` holds no per-search state; one instance can serve
/// concurrent searches.
#[derive(Clone)]
pub struct Finder {
    registry: CollectorRegistry,
    scheduler: Scheduler,
}

impl Finder {
    pub fn new(registry: CollectorRegistry, config: SearchConfig) -> Self {
        Self {
            registry,
            scheduler: Scheduler::new(config),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        self.scheduler.config()
    }

    pub fn registry(&self) -> &CollectorRegistry {
        &self.registry
    }

    /// Search for a person, always returning a result.
    ///
    /// An invalid name yields an empty result with confidence 0.
    pub async fn search(
        &self,
        name: &str,
        location: Option<&str>,
        context: Option<&str>,
        deadline: Duration,
    ) -> AggregatedResult {
        match self.try_search(name, location, context, deadline).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(error = %err, "search not started");
                AggregatedResult::empty(name, location, context)
            }
        }
    }

    /// Search for a person, failing fast on an invalid name.
    pub async fn try_search(
        &self,
        name: &str,
        location: Option<&str>,
        context: Option<&str>,
        deadline: Duration,
    ) -> Result<AggregatedResult, QueryGenerationError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let search_id = Uuid::new_v4();
        let name = name.trim();

        let queries: Arc<[Query]> = try_generate(name, location, context)?.into();
        let request = SearchRequest::new(name, queries.clone())
            .with_location(location)
            .with_context(context);

        let collectors = self.registry.collectors();
        tracing::info!(
            search_id = %search_id,
            name = name,
            queries = queries.len(),
            collectors = collectors.len(),
            deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
            "search started"
        );

        let engine = MergeEngine::new();
        let reports = self.scheduler.run(&collectors, &request, deadline, &engine).await;

        let (profiles, mentions) = engine.freeze();
        let profiles = rank(profiles, self.config().confidence_threshold);
        let attributes = correlate(&profiles);
        let elapsed_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            search_id = %search_id,
            profiles = profiles.len(),
            mentions = mentions.len(),
            confidence = attributes.confidence,
            failed = reports.iter().filter(|r| r.outcome.is_failed()).count(),
            elapsed_ms = elapsed_ms,
            "search finished"
        );

        Ok(AggregatedResult {
            search_id,
            name: name.to_string(),
            location: request.location,
            context: request.context,
            started_at,
            queries: queries.to_vec(),
            profiles,
            mentions,
            attributes,
            elapsed_ms,
            collectors: reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::sources::{PlatformSearchCollector, WebMentionCollector};
    use crate::collector::FixtureFetcher;

    const FIXTURE: &str = r#"
platforms:
  instagram:
    search:
      "*":
        - handle: jordanlee
          full_name: Jordan Lee
          followers: 100
          location: "Austin, TX"
          bio: "Photographer. Love travel."
        - { handle: jlee_art, full_name: J Lee }
engines:
  google:
    "*":
      - url: "https://www.instagram.com/jordanlee/"
        title: "Jordan Lee (@jordanlee) • Instagram"
      - url: "https://news.example.com/jordan-lee-award"
        title: "Jordan Lee wins award"
"#;

    fn finder(config: SearchConfig) -> Finder {
        let fetcher = Arc::new(FixtureFetcher::from_yaml(FIXTURE).unwrap());
        let mut registry = CollectorRegistry::new();
        registry.register(PlatformSearchCollector::new("instagram", fetcher.clone()));
        registry.register(WebMentionCollector::new("google", fetcher));
        Finder::new(registry, config)
    }

    #[tokio::test]
    async fn test_search_merges_across_collectors() {
        let result = finder(SearchConfig::default())
            .search("Jordan Lee", Some("Austin"), None, Duration::from_secs(5))
            .await;

        assert_eq!(result.collectors.len(), 2);
        assert!(result.collectors.iter().all(|r| r.outcome.is_completed()));

        // Platform search and the web result share (instagram, jordanlee)
        let top = &result.profiles[0];
        assert_eq!(top.stable_key, "jordanlee");
        assert_eq!(top.confidence, 1.0);
        assert_eq!(top.followers, 100);
        assert_eq!(top.collectors.len(), 2);
        assert_eq!(result.profiles.len(), 2);

        assert_eq!(result.mentions.len(), 1);
        assert!(result.attributes.interests.contains("photography"));
        assert!(result.attributes.locations.contains("Austin, TX"));
        assert_eq!(result.queries[0].text(), "\"Jordan Lee\"");
    }

    #[tokio::test]
    async fn test_threshold_filters_profiles() {
        let result = finder(SearchConfig::new().with_confidence_threshold(0.5))
            .search("Jordan Lee", None, None, Duration::from_secs(5))
            .await;

        assert_eq!(result.profiles.len(), 1);
        assert_eq!(result.confidence(), 1.0);
    }

    #[tokio::test]
    async fn test_empty_name() {
        let finder = finder(SearchConfig::default());
        let result = finder.search("  ", None, None, Duration::from_secs(5)).await;
        assert!(result.profiles.is_empty());
        assert_eq!(result.confidence(), 0.0);
        assert!(result.collectors.is_empty());

        assert_eq!(
            finder.try_search("", None, None, Duration::from_secs(5)).await.unwrap_err(),
            QueryGenerationError::EmptyName
        );
    }
}
