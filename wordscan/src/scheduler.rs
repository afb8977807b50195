//! Batched launching of scoped OS worker threads.
//!
//! Items are split into consecutive batches of at most `max_concurrency`.
//! Every worker of a batch is joined before the next batch starts, so at
//! most `max_concurrency` workers are alive at any time. A worker that
//! fails to launch or panics is recorded and never retried.

use std::num::NonZeroUsize;
use std::thread;
use tracing::{debug, warn};

use crate::metrics::ScanMetrics;

/// What happened to one scheduled item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome<T> {
    Completed(T),
    LaunchFailed(String),
    Panicked,
}

#[derive(Debug, Clone)]
pub struct BatchScheduler {
    max_concurrency: NonZeroUsize,
    label: &'static str,
    metrics: ScanMetrics,
}

impl BatchScheduler {
    pub fn new(max_concurrency: NonZeroUsize, label: &'static str) -> Self {
        Self::with_metrics(max_concurrency, label, ScanMetrics::new())
    }

    pub fn with_metrics(
        max_concurrency: NonZeroUsize,
        label: &'static str,
        metrics: ScanMetrics,
    ) -> Self {
        Self {
            max_concurrency,
            label,
            metrics,
        }
    }

    /// Runs `work(index, item)` for every item and returns outcomes in item order
    pub fn run<I, T, F>(&self, items: &[I], work: F) -> Vec<WorkerOutcome<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(usize, &I) -> T + Sync,
    {
        let cap = self.max_concurrency.get();
        let mut outcomes = Vec::with_capacity(items.len());
        let work = &work;

        for (batch_index, batch) in items.chunks(cap).enumerate() {
            let base = batch_index * cap;
            debug!(
                "Launching {} batch {} with {} workers",
                self.label,
                batch_index,
                batch.len()
            );

            thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .enumerate()
                    .map(|(offset, item)| {
                        let index = base + offset;
                        thread::Builder::new()
                            .name(format!("{}-{}", self.label, index))
                            .spawn_scoped(scope, move || work(index, item))
                    })
                    .collect();

                for (offset, handle) in handles.into_iter().enumerate() {
                    let index = base + offset;
                    let outcome = match handle {
                        Ok(handle) => {
                            self.metrics.record_launch();
                            match handle.join() {
                                Ok(value) => WorkerOutcome::Completed(value),
                                Err(_) => {
                                    warn!("{} worker {} panicked", self.label, index);
                                    self.metrics.record_worker_failure();
                                    WorkerOutcome::Panicked
                                }
                            }
                        }
                        Err(e) => {
                            warn!("Failed to launch {} worker {}: {}", self.label, index, e);
                            self.metrics.record_worker_failure();
                            WorkerOutcome::LaunchFailed(e.to_string())
                        }
                    };
                    outcomes.push(outcome);
                }
            });
        }

        outcomes
    }
}
