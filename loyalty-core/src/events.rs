//! Work-queue plumbing between the dispatcher and the worker pool.

use tokio::sync::mpsc;

/// Default bound of the order work queue; enqueueing blocks past this,
/// which is what lets a stalled pool backpressure the dispatcher.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Sender handle for order numbers awaiting a poll.
pub type OrderQueueSender = mpsc::Sender<String>;
/// Receiver handle for order numbers awaiting a poll.
pub type OrderQueueReceiver = mpsc::Receiver<String>;

/// Create the bounded order work queue. The dispatcher owns the sender and
/// is the only party that ever closes the channel (by dropping it).
pub fn order_queue_channel(capacity: usize) -> (OrderQueueSender, OrderQueueReceiver) {
    mpsc::channel(capacity)
}
