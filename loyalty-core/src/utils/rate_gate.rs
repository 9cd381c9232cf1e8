//! Cooperative rate gate shared by the dispatcher and all workers.
//!
//! The whole state is one atomic epoch-milliseconds deadline. Any worker
//! that sees a 429 arms the gate; everyone else observes the deadline
//! before taking their next unit of work. The gate is best-effort: a task
//! that has already passed may still issue one request that hits 429, and
//! that response re-arms the gate.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[derive(Debug, Default)]
pub struct RateGate {
    sleep_until: AtomicI64,
}

impl RateGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the deadline to `now + seconds`. Millisecond resolution, so the
    /// full wait is honored rather than truncated to whole seconds.
    pub fn arm(&self, seconds: u64) {
        let deadline = now_millis() + (seconds as i64) * 1000;
        self.sleep_until.store(deadline, Ordering::SeqCst);
    }

    fn remaining(&self) -> Duration {
        let deadline = self.sleep_until.load(Ordering::SeqCst);
        Duration::from_millis(deadline.saturating_sub(now_millis()).max(0) as u64)
    }

    /// Wait until the deadline has passed or shutdown fires. A re-arm
    /// during the wait extends it; the loop re-reads the deadline after
    /// every sleep.
    pub async fn pass(&self, shutdown_rx: &mut watch::Receiver<bool>) {
        loop {
            if *shutdown_rx.borrow() {
                return;
            }
            let wait = self.remaining();
            if wait.is_zero() {
                return;
            }
            tracing::debug!(wait_secs = wait.as_secs(), "rate gate armed, pausing");
            tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        return;
                    }
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}
