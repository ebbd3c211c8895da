//! Common test utilities for search integration tests
//!
//! Scripted collectors with fixed behavior (return records, sleep, hang,
//! fail, panic) and helpers for building finders over them.

#![allow(dead_code)]

use async_trait::async_trait;
use person_finder::collector::{
    CandidateRecord, CollectRequest, Collection, Collector, CollectorError, CollectorRegistry,
    SourceKind,
};
use person_finder::{Finder, SearchConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What a scripted collector does when called
#[derive(Clone)]
pub enum Script {
    /// Return these records immediately
    Records(Vec<CandidateRecord>),
    /// Sleep, then return these records
    Delayed(Duration, Vec<CandidateRecord>),
    /// Never return, ignoring the budget
    Hang,
    /// Fail structurally
    Fail(String),
    Panic,
}

pub struct ScriptedCollector {
    id: String,
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedCollector {
    pub fn new(id: &str, script: Script) -> Self {
        Self {
            id: id.to_string(),
            script,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, readable after the collector is registered
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Collector for ScriptedCollector {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Scripted Collector"
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Platform
    }

    async fn collect(&self, _request: &CollectRequest) -> Result<Collection, CollectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Records(records) => Ok(collection_of(records)),
            Script::Delayed(delay, records) => {
                tokio::time::sleep(*delay).await;
                Ok(collection_of(records))
            }
            Script::Hang => std::future::pending().await,
            Script::Fail(reason) => Err(CollectorError::Unavailable(reason.clone())),
            Script::Panic => panic!("scripted collector panic"),
        }
    }
}

fn collection_of(records: &[CandidateRecord]) -> Collection {
    let mut collection = Collection::completed();
    for record in records {
        collection.add_record(record.clone());
    }
    collection
}

/// A record as a platform collector would build it
pub fn record(source: &str, key: &str, confidence: f64) -> CandidateRecord {
    CandidateRecord::new(source, key, "Jordan Lee")
        .with_confidence(confidence)
        .with_provenance(format!("{} search", source))
}

/// Finder over scripted collectors
pub fn finder(collectors: Vec<ScriptedCollector>, config: SearchConfig) -> Finder {
    let mut registry = CollectorRegistry::new();
    for collector in collectors {
        registry.register(collector);
    }
    Finder::new(registry, config)
}
