//! Fan-out/fan-in over the registered collectors
//!
//! Every collector gets its own task. A semaphore caps how many run at
//! once; queued collectors are admitted in dispatch order as slots free up,
//! each with an allowance recomputed at admission so late starters never
//! outlive the global deadline. Results are merged as they are joined. A
//! deadline too large to represent means no deadline. When the deadline
//! passes the scheduler cancels the search, stops waiting and reports every
//! outstanding collector as `PartialTimeout`; output that arrives later is
//! never read.

use super::merger::MergeEngine;
use super::types::{CollectorReport, SearchRequest};
use crate::collector::{
    CancellationToken, CollectBudget, CollectRequest, Collection, Collector, CollectorOutcome,
};
use crate::config::SearchConfig;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

const PANICKED: &str = "collector panicked";

/// Stand-in for "no deadline": roughly 30 years out
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// How a dispatched collector call ended at the contract boundary
enum Finished {
    Collected(Collection),
    Failed(String),
    /// Still running after its budget plus grace
    Overran,
}

/// What one dispatch task hands back to the scheduler loop
enum Dispatch {
    /// The deadline passed before a slot freed up
    NotAdmitted,
    Ran { finished: Finished, elapsed: Duration },
}

/// Aborts the collector task if the dispatch task is dropped or gives up
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Everything a dispatch task needs, shared across all of them
#[derive(Clone)]
struct Dispatcher {
    cancel: CancellationToken,
    admitted: Arc<DashMap<usize, Instant>>,
    deadline_at: Instant,
    max_budget: Duration,
    grace: Duration,
    max_queries: usize,
    request: SearchRequest,
}

impl Dispatcher {
    async fn dispatch(
        self,
        idx: usize,
        collector: Arc<dyn Collector>,
        permit: Option<OwnedSemaphorePermit>,
    ) -> (usize, Dispatch) {
        let Some(_permit) = permit else {
            return (idx, Dispatch::NotAdmitted);
        };

        let now = Instant::now();
        if self.cancel.is_cancelled() || now >= self.deadline_at {
            return (idx, Dispatch::NotAdmitted);
        }
        let budget = (self.deadline_at - now).min(self.max_budget);
        self.admitted.insert(idx, now);

        let max_queries = self.max_queries.min(collector.max_queries());
        let request = CollectRequest::new(
            self.request.name.clone(),
            self.request.queries.clone(),
            CollectBudget::new(budget, self.cancel.clone()),
        )
        .with_location(self.request.location.clone())
        .with_context(self.request.context.clone())
        .with_max_queries(max_queries);

        tracing::debug!(
            collector = collector.id(),
            budget_ms = millis(budget),
            max_queries = max_queries,
            "dispatching collector"
        );

        let mut task = AbortOnDrop(tokio::spawn(async move { collector.collect(&request).await }));
        let boundary = budget.saturating_add(self.grace);
        let finished = match tokio::time::timeout(boundary, &mut task.0).await {
            Ok(Ok(Ok(collection))) => Finished::Collected(collection),
            Ok(Ok(Err(err))) => Finished::Failed(err.to_string()),
            Ok(Err(err)) if err.is_panic() => Finished::Failed(PANICKED.to_string()),
            Ok(Err(err)) => Finished::Failed(err.to_string()),
            Err(_) => Finished::Overran,
        };

        (
            idx,
            Dispatch::Ran {
                finished,
                elapsed: now.elapsed(),
            },
        )
    }
}

/// Runs collectors concurrently under a global deadline
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SearchConfig,
}

impl Scheduler {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run every collector, feeding `engine` as results arrive.
    ///
    /// Returns one report per collector, in the order given. Never takes
    /// longer than `deadline` plus the cost of settling results already
    /// returned.
    pub async fn run(
        &self,
        collectors: &[Arc<dyn Collector>],
        request: &SearchRequest,
        deadline: Duration,
        engine: &MergeEngine,
    ) -> Vec<CollectorReport> {
        let deadline_at = deadline_from(Instant::now(), deadline);
        let slots = Arc::new(Semaphore::new(self.config.max_in_flight_collectors.max(1)));
        let dispatcher = Dispatcher {
            cancel: CancellationToken::new(),
            admitted: Arc::new(DashMap::new()),
            deadline_at,
            max_budget: self.config.max_per_collector_budget,
            grace: self.config.boundary_grace,
            max_queries: self.config.max_queries_per_collector,
            request: request.clone(),
        };

        // Slots are taken here, in dispatch order, so a queued collector
        // is admitted strictly after every collector ahead of it.
        let mut tasks = JoinSet::new();
        for (idx, collector) in collectors.iter().enumerate() {
            let permit = match tokio::time::timeout_at(deadline_at, slots.clone().acquire_owned()).await {
                Ok(Ok(permit)) => Some(permit),
                Ok(Err(_)) | Err(_) => None,
            };
            tasks.spawn(dispatcher.clone().dispatch(idx, collector.clone(), permit));
        }

        let mut reports: Vec<Option<CollectorReport>> = vec![None; collectors.len()];
        let mut deadline_passed = false;
        loop {
            match tokio::time::timeout_at(deadline_at, tasks.join_next()).await {
                Ok(Some(Ok((idx, dispatch)))) => {
                    reports[idx] = Some(settle(collectors[idx].id(), dispatch, engine));
                }
                Ok(Some(Err(err))) => {
                    tracing::warn!(error = %err, "dispatch task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    deadline_passed = true;
                    break;
                }
            }
        }

        dispatcher.cancel.cancel();
        tasks.abort_all();

        reports
            .into_iter()
            .zip(collectors)
            .enumerate()
            .map(|(idx, (report, collector))| {
                report.unwrap_or_else(|| {
                    let admitted_at = dispatcher.admitted.get(&idx).map(|at| *at);
                    abandoned(collector.id(), admitted_at, deadline_passed)
                })
            })
            .collect()
    }
}

/// Turn a returned dispatch into a report, merging what it collected
fn settle(collector: &str, dispatch: Dispatch, engine: &MergeEngine) -> CollectorReport {
    let (finished, elapsed) = match dispatch {
        Dispatch::NotAdmitted => {
            tracing::warn!(collector = collector, "deadline passed before collector was admitted");
            let mut report = CollectorReport::new(collector, CollectorOutcome::PartialTimeout);
            report.admitted = false;
            return report;
        }
        Dispatch::Ran { finished, elapsed } => (finished, elapsed),
    };

    let mut report = match finished {
        Finished::Collected(collection) => collected(collector, collection, engine),
        Finished::Failed(reason) => {
            tracing::warn!(collector = collector, reason = %reason, "collector failed");
            CollectorReport::new(collector, CollectorOutcome::Failed(reason))
        }
        Finished::Overran => {
            tracing::warn!(collector = collector, "collector overran its budget");
            CollectorReport::new(collector, CollectorOutcome::PartialTimeout)
        }
    };
    report.elapsed_ms = millis(elapsed);
    report
}

fn collected(collector: &str, collection: Collection, engine: &MergeEngine) -> CollectorReport {
    let mut report = CollectorReport::new(collector, collection.outcome.clone());
    report.warnings = collection.warnings;

    if collection.outcome.is_failed() {
        tracing::warn!(collector = collector, outcome = %collection.outcome, "collector failed");
        return report;
    }

    engine.ingest_all(&collection.records);
    report.records = collection.records.len();
    report.mentions = collection.mentions.len();
    for mention in collection.mentions {
        engine.ingest_mention(mention);
    }

    if collection.outcome.is_completed() {
        tracing::debug!(
            collector = collector,
            records = report.records,
            mentions = report.mentions,
            "collector completed"
        );
    } else {
        tracing::warn!(
            collector = collector,
            records = report.records,
            outcome = %collection.outcome,
            "collector returned partial results"
        );
    }
    report
}

/// Report for a collector still outstanding when the scheduler stopped waiting
fn abandoned(collector: &str, admitted_at: Option<Instant>, deadline_passed: bool) -> CollectorReport {
    let outcome = if deadline_passed {
        CollectorOutcome::PartialTimeout
    } else {
        CollectorOutcome::Failed(PANICKED.to_string())
    };
    tracing::warn!(collector = collector, outcome = %outcome, "collector abandoned");

    let mut report = CollectorReport::new(collector, outcome);
    report.admitted = admitted_at.is_some();
    report.elapsed_ms = admitted_at.map(|at| millis(at.elapsed())).unwrap_or(0);
    report
}

/// `now + deadline`, clamped for deadlines too large to represent
fn deadline_from(now: Instant, deadline: Duration) -> Instant {
    now.checked_add(deadline)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
