//! HTTP surface.
//!
//! This layer is the only place semantic outcomes become status codes.
//! Failure bodies carry a short phrase; details stay in the logs.

pub mod extractors;
mod ping;
mod user;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::TraceLayer;

use loyalty_core::service::ServiceError;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/user/register", post(user::register::register))
        .route("/api/user/login", post(user::login::login))
        .route(
            "/api/user/orders",
            post(user::submit_order::submit_order).get(user::list_orders::list_orders),
        )
        .route("/api/user/balance", get(user::balance::balance))
        .route(
            "/api/user/balance/withdraw",
            post(user::withdraw::withdraw),
        )
        .route(
            "/api/user/withdrawals",
            get(user::list_withdrawals::list_withdrawals),
        )
        .route("/ping", get(ping::ping))
        .layer(RequestDecompressionLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler-level failures, mapped onto the status codes of the public API.
#[derive(Debug)]
pub enum ApiError {
    MissingCredentials,
    InvalidContentType,
    MissingOrderNumber,
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingCredentials => (
                StatusCode::BAD_REQUEST,
                "Missing required fields: login or password",
            ),
            ApiError::InvalidContentType => (StatusCode::BAD_REQUEST, "Invalid Content-Type"),
            ApiError::MissingOrderNumber => (StatusCode::BAD_REQUEST, "Order number is required"),
            ApiError::Service(err) => match err {
                ServiceError::InvalidOrderNumber => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "Invalid order number")
                }
                ServiceError::DuplicateLogin => (StatusCode::CONFLICT, "Login already exists"),
                ServiceError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Invalid login or password")
                }
                ServiceError::InsufficientFunds => {
                    (StatusCode::PAYMENT_REQUIRED, "Not enough bonuses")
                }
                ServiceError::NonPositiveSum => (StatusCode::BAD_REQUEST, "Sum must be positive"),
                ServiceError::NoOrders | ServiceError::NoWithdrawals => {
                    return StatusCode::NO_CONTENT.into_response();
                }
                ServiceError::PasswordHash(_) | ServiceError::Token(_) | ServiceError::Ledger(_) => {
                    tracing::error!(error = %err, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                }
            },
        };

        (status, message).into_response()
    }
}
