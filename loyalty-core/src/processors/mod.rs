//! The accrual reconciliation pipeline.
//!
//! One dispatcher task periodically drains pending orders from the ledger
//! into a bounded work queue; a fixed pool of workers polls the accrual
//! service for each order and applies the outcome. Everything shares one
//! shutdown signal and one rate gate; nothing inside the loop is fatal.

pub mod dispatcher;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

pub use dispatcher::OrderDispatcher;
pub use worker::AccrualWorker;

use crate::accrual::AccrualClient;
use crate::events::{order_queue_channel, DEFAULT_QUEUE_CAPACITY};
use crate::storage::Ledger;
use crate::utils::RateGate;

#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Interval between pending-order scans.
    pub poll_interval: Duration,
    /// Number of polling workers.
    pub worker_count: usize,
    /// Bound of the order work queue.
    pub queue_capacity: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            worker_count: 10,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Spawn the dispatcher and worker pool. The returned handles complete once
/// the shutdown signal turns true and the queue has drained; callers await
/// them to finish a graceful shutdown.
pub fn spawn_reconcile_pipeline(
    ledger: Arc<dyn Ledger>,
    client: Arc<dyn AccrualClient>,
    gate: Arc<RateGate>,
    config: ReconcileConfig,
    shutdown_rx: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let (queue_tx, queue_rx) = order_queue_channel(config.queue_capacity);
    let shared_queue = Arc::new(Mutex::new(queue_rx));

    let mut handles = Vec::with_capacity(config.worker_count + 1);

    for id in 0..config.worker_count {
        let worker = AccrualWorker::new(id, ledger.clone(), client.clone(), gate.clone());
        let rx = shutdown_rx.clone();
        let queue = shared_queue.clone();
        handles.push(tokio::spawn(async move { worker.run(rx, queue).await }));
    }

    let dispatcher = OrderDispatcher::new(ledger, gate, config.poll_interval);
    handles.push(tokio::spawn(
        async move { dispatcher.run(shutdown_rx, queue_tx).await },
    ));

    tracing::info!(
        workers = config.worker_count,
        poll_interval_secs = config.poll_interval.as_secs(),
        "reconciliation pipeline started"
    );

    handles
}
