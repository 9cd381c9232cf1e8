//! Accrual polling workers.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, warn};

use crate::accrual::{AccrualClient, AccrualError, AccrualReply, AccrualStatus};
use crate::entities::OrderStatus;
use crate::events::OrderQueueReceiver;
use crate::storage::{Ledger, LedgerError};
use crate::utils::RateGate;

/// The work queue receiver, shared by the pool. Workers take the lock only
/// for the duration of one dequeue.
pub type SharedOrderQueue = Arc<Mutex<OrderQueueReceiver>>;

#[derive(Debug, Error)]
enum PollError {
    #[error(transparent)]
    Accrual(#[from] AccrualError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// One member of the polling pool: waits at the rate gate, dequeues an
/// order number, asks the accrual service about it, and applies the
/// outcome. Exits when the queue is closed and drained or shutdown fires.
pub struct AccrualWorker {
    id: usize,
    ledger: Arc<dyn Ledger>,
    client: Arc<dyn AccrualClient>,
    gate: Arc<RateGate>,
}

impl AccrualWorker {
    pub fn new(
        id: usize,
        ledger: Arc<dyn Ledger>,
        client: Arc<dyn AccrualClient>,
        gate: Arc<RateGate>,
    ) -> Self {
        Self {
            id,
            ledger,
            client,
            gate,
        }
    }

    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>, queue: SharedOrderQueue) {
        debug!(worker = self.id, "accrual worker started");

        loop {
            self.gate.pass(&mut shutdown_rx).await;
            if *shutdown_rx.borrow() {
                break;
            }

            let next = tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }

                item = async { queue.lock().await.recv().await } => item,
            };

            let Some(order_number) = next else {
                // Channel closed and drained.
                break;
            };

            if let Err(e) = self.poll_order(&order_number).await {
                error!(worker = self.id, order_number, error = %e, "failed to process order");
            }
        }

        debug!(worker = self.id, "accrual worker stopped");
    }

    async fn poll_order(&self, order_number: &str) -> Result<(), PollError> {
        match self.client.fetch(order_number).await? {
            AccrualReply::Ok { status, accrual } => {
                let (local, credited) = map_outcome(status, accrual);
                self.ledger
                    .apply_accrual(order_number, local, credited)
                    .await?;
                debug!(order_number, status = ?local, accrual = %credited, "order updated");
            }
            AccrualReply::RateLimited { retry_after_secs } => {
                warn!(order_number, retry_after_secs, "rate limited, pausing updates");
                self.gate.arm(retry_after_secs);
            }
            AccrualReply::NotFound => {
                warn!(order_number, "order not known to accrual service");
            }
            AccrualReply::RemoteError => {
                warn!(order_number, "accrual service unavailable");
            }
            AccrualReply::Unexpected { code } => {
                warn!(order_number, code, "unexpected status from accrual service");
            }
        }
        Ok(())
    }
}

/// Map a remote status to the local state and the amount to credit. Only a
/// PROCESSED order carries its accrual through; every other transition is
/// value-neutral.
fn map_outcome(status: AccrualStatus, accrual: Decimal) -> (OrderStatus, Decimal) {
    match status {
        AccrualStatus::Registered | AccrualStatus::Processing => {
            (OrderStatus::Processing, Decimal::ZERO)
        }
        AccrualStatus::Invalid => (OrderStatus::Invalid, Decimal::ZERO),
        AccrualStatus::Processed => (OrderStatus::Processed, accrual),
    }
}
