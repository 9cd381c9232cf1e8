use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::extractors::AuthUser;
use crate::api::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(in crate::api) struct WithdrawRequest {
    order: String,
    #[serde(with = "rust_decimal::serde::float")]
    sum: Decimal,
}

/// `POST /api/user/balance/withdraw` — spend bonus points against an order.
/// 402 when the balance does not cover the sum.
pub(in crate::api) async fn withdraw(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<WithdrawRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .withdraw(user_id, &body.order, body.sum)
        .await?;
    Ok(StatusCode::OK)
}
