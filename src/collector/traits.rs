//! Collector trait defining the per-source search interface

use super::types::{CollectRequest, Collection, CollectorError, SourceKind};
use crate::query::Query;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for collectors
///
/// A collector queries one information source and turns its hits into
/// candidate records. It owns no I/O: network access comes from the
/// fetch capability it was built with.
///
/// Contract:
/// - consume at most a bounded prefix of the request's queries;
/// - never run past `request.budget`; once it is exhausted, stop issuing
///   requests and return what was gathered with `PartialTimeout`;
/// - record a failed query and move on to the next; only a structural
///   failure returns `Err`.
///
/// # Example
///
/// ```ignore
/// struct StaticCollector;
///
/// #[async_trait]
/// impl Collector for StaticCollector {
///     fn id(&self) -> &str { "static" }
///     fn name(&self) -> &str { "Static Collector" }
///     fn source_kind(&self) -> SourceKind { SourceKind::Directory }
///
///     async fn collect(&self, request: &CollectRequest) -> Result<Collection, CollectorError> {
///         Ok(Collection::completed())
///     }
/// }
/// ```
#[async_trait]
pub trait Collector: Send + Sync {
    /// Unique identifier for this collector
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Which kind of source this collector covers
    fn source_kind(&self) -> SourceKind;

    /// Whether this collector wants to run a given query
    fn accepts(&self, _query: &Query) -> bool {
        true
    }

    /// Collector-specific cap on consumed queries
    fn max_queries(&self) -> usize {
        usize::MAX
    }

    /// Dispatch order when concurrency is capped (lower = earlier)
    fn priority(&self) -> u32 {
        100
    }

    /// Run the collector against the request's queries
    async fn collect(&self, request: &CollectRequest) -> Result<Collection, CollectorError>;
}

/// Registry of available collectors
#[derive(Clone, Default)]
pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl CollectorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector
    pub fn register<C: Collector + 'static>(&mut self, collector: C) {
        self.collectors.push(Arc::new(collector));
    }

    /// Register an already shared collector
    pub fn register_shared(&mut self, collector: Arc<dyn Collector>) {
        self.collectors.push(collector);
    }

    /// All collectors sorted by priority, registration order breaking ties
    pub fn collectors(&self) -> Vec<Arc<dyn Collector>> {
        let mut collectors = self.collectors.clone();
        collectors.sort_by_key(|c| c.priority());
        collectors
    }

    /// Collectors covering one kind of source
    pub fn collectors_for(&self, kind: SourceKind) -> Vec<Arc<dyn Collector>> {
        self.collectors()
            .into_iter()
            .filter(|c| c.source_kind() == kind)
            .collect()
    }

    /// Registered collector ids, in dispatch order
    pub fn ids(&self) -> Vec<String> {
        self.collectors().iter().map(|c| c.id().to_string()).collect()
    }

    /// Number of registered collectors
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}
