//! User API handlers.
//!
//! # Endpoints
//!
//! - `POST /api/user/register`         – create account, set auth cookie
//! - `POST /api/user/login`            – authenticate, set auth cookie
//! - `POST /api/user/orders`           – submit an order number (text/plain)
//! - `GET  /api/user/orders`           – list submitted orders
//! - `GET  /api/user/balance`          – current and withdrawn totals
//! - `POST /api/user/balance/withdraw` – spend bonus points
//! - `GET  /api/user/withdrawals`      – list withdrawals

pub(super) mod balance;
pub(super) mod list_orders;
pub(super) mod list_withdrawals;
pub(super) mod login;
pub(super) mod register;
pub(super) mod submit_order;
pub(super) mod withdraw;

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use loyalty_core::entities::{OrderRecord, OrderStatus, WithdrawalRecord};

use super::extractors::AUTH_COOKIE;

#[derive(Debug, Deserialize)]
pub(super) struct Credentials {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct OrderResponse {
    number: String,
    status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    accrual: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    uploaded_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub(super) struct WithdrawalResponse {
    order: String,
    #[serde(with = "rust_decimal::serde::float")]
    sum: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    processed_at: OffsetDateTime,
}

fn to_order_response(record: OrderRecord) -> OrderResponse {
    OrderResponse {
        number: record.order_number,
        status: record.status,
        accrual: record.accrual,
        uploaded_at: record.uploaded_at,
    }
}

fn to_withdrawal_response(record: WithdrawalRecord) -> WithdrawalResponse {
    WithdrawalResponse {
        order: record.order_number,
        sum: record.sum,
        processed_at: record.processed_at,
    }
}

/// Attach the freshly minted token as an HttpOnly session cookie.
fn with_auth_cookie(jar: CookieJar, token: String, ttl: Duration) -> CookieJar {
    let max_age = time::Duration::try_from(ttl).unwrap_or(time::Duration::hours(1));
    let cookie = Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .path("/")
        .max_age(max_age)
        .build();
    jar.add(cookie)
}
