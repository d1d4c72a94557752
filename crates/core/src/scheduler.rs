//! Batch scheduler: partitions the symbol universe and runs batch workers
//! under a bounded concurrency cap.
//!
//! Each batch is spawned as its own task gated by an owned semaphore permit,
//! so at most `max_concurrency` batches execute at once. Workers accumulate
//! into private buffers that are merged here after every task joins; no
//! shared collection is ever locked across a retrieval call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::models::ResultSet;
use crate::traits::ProviderFactory;
use crate::worker;

/// Default symbols per batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;
/// Default concurrent-batch cap.
pub const DEFAULT_MAX_CONCURRENCY: usize = 20;

/// Cooperative cancellation handle shared by all batch workers.
///
/// Cancelling stops workers from launching new symbol fetches; results
/// already recorded remain valid partial output.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct BatchScheduler {
    factory: Arc<dyn ProviderFactory>,
    batch_size: usize,
    max_concurrency: usize,
    cancel: CancelFlag,
}

impl BatchScheduler {
    /// Creates a scheduler; zero sizes are clamped to 1.
    #[must_use]
    pub fn new(
        factory: Arc<dyn ProviderFactory>,
        batch_size: usize,
        max_concurrency: usize,
    ) -> Self {
        Self {
            factory,
            batch_size: batch_size.max(1),
            max_concurrency: max_concurrency.max(1),
            cancel: CancelFlag::new(),
        }
    }

    /// Handle for stopping the run from another task (e.g. a signal handler).
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Runs every batch to completion and merges all worker buffers.
    ///
    /// Content-deterministic for the same inputs; the order of `results` is
    /// whatever batch completion produced and is left unsorted by design.
    /// If a batch task itself dies (panic or runtime abort), its symbols are
    /// recorded as not-found so the run still accounts for every symbol.
    pub async fn run(&self, symbols: Vec<String>) -> ResultSet {
        let total = symbols.len();
        let batches: Vec<Vec<String>> = symbols
            .chunks(self.batch_size)
            .map(<[String]>::to_vec)
            .collect();
        info!(
            "Scheduling {} symbols across {} batches (cap {})",
            total,
            batches.len(),
            self.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles = Vec::with_capacity(batches.len());
        for (idx, batch) in batches.into_iter().enumerate() {
            let batch_num = idx + 1;
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                // Semaphore is never closed; bail defensively if it ever is.
                break;
            };
            let factory = self.factory.clone();
            let cancel = self.cancel.clone();
            let assigned = batch.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                worker::process_batch(batch_num, batch, factory, cancel).await
            });
            handles.push((batch_num, assigned, handle));
        }

        let mut set = ResultSet::default();
        for (batch_num, assigned, handle) in handles {
            match handle.await {
                Ok(outcome) => set.merge(outcome),
                Err(e) => {
                    error!("Batch {} aborted unexpectedly: {}", batch_num, e);
                    set.not_found.extend(assigned);
                }
            }
        }
        info!(
            "Run complete: {} resolved, {} not found",
            set.results.len(),
            set.not_found.len()
        );
        set
    }
}
