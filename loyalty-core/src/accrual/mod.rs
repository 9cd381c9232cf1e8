//! Client for the external accrual service.
//!
//! The reconciliation workers only ever see the tagged [`AccrualReply`],
//! never raw HTTP, so tests can script responses by implementing
//! [`AccrualClient`].

pub mod http;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

pub use http::HttpAccrualClient;

/// Order state as reported by the accrual service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

/// Outcome of one poll of the accrual service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccrualReply {
    /// HTTP 200 with a decoded body. `accrual` is 0 when absent.
    Ok {
        status: AccrualStatus,
        accrual: Decimal,
    },
    /// HTTP 429. Absent or unparseable `Retry-After` yields 0.
    RateLimited { retry_after_secs: u64 },
    /// HTTP 204: the remote has no record of this order.
    NotFound,
    /// HTTP 5xx, retries exhausted.
    RemoteError,
    /// Any other response.
    Unexpected { code: u16 },
}

/// Transport-level failure after retries are exhausted.
#[derive(Debug, Error)]
pub enum AccrualError {
    #[error("accrual request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait AccrualClient: Send + Sync {
    async fn fetch(&self, order_number: &str) -> Result<AccrualReply, AccrualError>;
}
