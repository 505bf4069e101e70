//! Runs many independent client sessions in parallel.
//!
//! Each worker is one tokio task simulating one client: it executes its
//! transactions strictly in order, one exchange fully finished before the
//! next, while workers run concurrently with respect to each other. Nothing
//! is shared between workers except the remote service itself.

use std::time::Duration;

use tokio::task::JoinSet;

use crate::driver::{Driver, Outcome};
use crate::error::HarnessError;
use crate::transaction::Transaction;

/// Externally supplied run parameters.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub address: String,
    pub phase_timeout: Duration,
}

/// One batch of concurrent workers, each with its own ordered transaction
/// sequence.
#[derive(Debug, Clone)]
pub struct Batch {
    pub workers: Vec<Vec<Transaction>>,
}

/// The ordered outcomes one worker produced.
#[derive(Debug)]
pub struct WorkerReport {
    pub worker: usize,
    pub outcomes: Vec<Outcome>,
}

/// Accepted/rejected/failed counts across a set of reports.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl Tally {
    pub fn of(reports: &[WorkerReport]) -> Self {
        let mut tally = Tally::default();
        for outcome in reports.iter().flat_map(|r| r.outcomes.iter()) {
            match outcome {
                Outcome::Success(_) => tally.accepted += 1,
                Outcome::Rejected { .. } => tally.rejected += 1,
                Outcome::Failed { .. } => tally.failed += 1,
            }
        }
        tally
    }
}

/// Runs every worker of one batch to completion and returns their reports in
/// worker order. Failed transactions are reported, never retried or
/// reordered.
pub async fn run_batch(config: &RunConfig, batch: Batch) -> Result<Vec<WorkerReport>, HarnessError> {
    let mut tasks = JoinSet::new();
    for (worker, transactions) in batch.workers.into_iter().enumerate() {
        let address = config.address.clone();
        let driver = Driver::new(config.phase_timeout);
        tasks.spawn(async move {
            let mut outcomes = Vec::with_capacity(transactions.len());
            for tx in &transactions {
                // One exchange fully done before the next for this worker.
                outcomes.push(driver.execute(&address, tx).await);
            }
            WorkerReport { worker, outcomes }
        });
    }

    let mut reports = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        reports.push(joined?);
    }
    reports.sort_by_key(|r| r.worker);
    Ok(reports)
}

/// Runs batches back to back, waiting for every worker of one batch before
/// the next starts, so a later batch observes the accumulated effect of the
/// earlier ones.
pub async fn run_batches(
    config: &RunConfig,
    batches: Vec<Batch>,
) -> Result<Vec<Vec<WorkerReport>>, HarnessError> {
    let mut all = Vec::with_capacity(batches.len());
    for batch in batches {
        all.push(run_batch(config, batch).await?);
    }
    Ok(all)
}
