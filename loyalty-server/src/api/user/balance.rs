use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::extractors::AuthUser;
use crate::api::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(in crate::api) struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::float")]
    current: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    withdrawn: Decimal,
}

/// `GET /api/user/balance` — live balance plus the all-time withdrawn sum.
pub(in crate::api) async fn balance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.service.balance(user_id).await?;
    Ok(Json(BalanceResponse {
        current: balance.current,
        withdrawn: balance.withdrawn,
    }))
}
