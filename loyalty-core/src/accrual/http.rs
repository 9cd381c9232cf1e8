use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AccrualClient, AccrualError, AccrualReply, AccrualStatus};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_COUNT: u32 = 3;
const RETRY_WAIT: Duration = Duration::from_secs(2);

/// 200-body of `GET {base}/api/orders/{number}`.
#[derive(Debug, Deserialize)]
struct AccrualOrderBody {
    #[allow(dead_code)]
    order: String,
    status: AccrualStatus,
    #[serde(default, with = "rust_decimal::serde::float")]
    accrual: Decimal,
}

pub struct HttpAccrualClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAccrualClient {
    /// Fails only if the underlying HTTP client cannot be constructed; the
    /// per-call deadline is baked into the client, so a fallback without it
    /// is not an option.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AccrualError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    fn order_url(&self, order_number: &str) -> String {
        format!(
            "{}/api/orders/{}",
            self.base_url.trim_end_matches('/'),
            order_number
        )
    }
}

fn retry_after_secs(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl AccrualClient for HttpAccrualClient {
    /// One poll, retrying transport errors and 5xx up to [`RETRY_COUNT`]
    /// times with a [`RETRY_WAIT`] pause. 2xx, 204 and 429 are never
    /// retried.
    async fn fetch(&self, order_number: &str) -> Result<AccrualReply, AccrualError> {
        let url = self.order_url(order_number);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let response = match self.http.get(&url).send().await {
                Ok(response) => response,
                Err(e) if attempt <= RETRY_COUNT => {
                    warn!(order_number, error = %e, attempt, "accrual request failed, retrying");
                    tokio::time::sleep(RETRY_WAIT).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let code = response.status();
            if code.is_server_error() {
                if attempt <= RETRY_COUNT {
                    warn!(order_number, code = code.as_u16(), attempt, "accrual 5xx, retrying");
                    tokio::time::sleep(RETRY_WAIT).await;
                    continue;
                }
                return Ok(AccrualReply::RemoteError);
            }

            return match code {
                StatusCode::OK => {
                    let body: AccrualOrderBody = response.json().await?;
                    debug!(order_number, status = ?body.status, accrual = %body.accrual, "accrual reply");
                    Ok(AccrualReply::Ok {
                        status: body.status,
                        accrual: body.accrual,
                    })
                }
                StatusCode::NO_CONTENT => Ok(AccrualReply::NotFound),
                StatusCode::TOO_MANY_REQUESTS => Ok(AccrualReply::RateLimited {
                    retry_after_secs: retry_after_secs(&response),
                }),
                other => Ok(AccrualReply::Unexpected {
                    code: other.as_u16(),
                }),
            };
        }
    }
}
