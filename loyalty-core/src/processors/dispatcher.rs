//! Periodic pending-order scan.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::events::OrderQueueSender;
use crate::storage::{Ledger, LedgerError};
use crate::utils::RateGate;

/// Reads NEW/PROCESSING orders from the ledger on every tick and enqueues
/// their numbers for the worker pool. Owns the queue sender: dropping it on
/// exit closes the channel, which is how workers learn the pipeline is done.
pub struct OrderDispatcher {
    ledger: Arc<dyn Ledger>,
    gate: Arc<RateGate>,
    poll_interval: Duration,
}

impl OrderDispatcher {
    pub fn new(ledger: Arc<dyn Ledger>, gate: Arc<RateGate>, poll_interval: Duration) -> Self {
        Self {
            ledger,
            gate,
            poll_interval,
        }
    }

    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>, queue_tx: OrderQueueSender) {
        info!("order dispatcher started");
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("order dispatcher received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    self.gate.pass(&mut shutdown_rx).await;
                    if *shutdown_rx.borrow() {
                        info!("order dispatcher received shutdown signal");
                        break;
                    }
                    if let Err(e) = self.dispatch_pending(&queue_tx, &mut shutdown_rx).await {
                        error!(error = %e, "failed to dispatch pending orders");
                    }
                }
            }
        }

        // queue_tx drops here; workers drain the remaining items and stop.
        info!("order dispatcher shutdown complete");
    }

    async fn dispatch_pending(
        &self,
        queue_tx: &OrderQueueSender,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> Result<(), LedgerError> {
        let pending = self.ledger.get_pending_orders().await?;
        if pending.is_empty() {
            return Ok(());
        }
        debug!(count = pending.len(), "enqueueing pending orders");

        for order in pending {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        return Ok(());
                    }
                }

                sent = queue_tx.send(order.order_number) => {
                    if sent.is_err() {
                        return Ok(());
                    }
                }
            }
        }

        Ok(())
    }
}
