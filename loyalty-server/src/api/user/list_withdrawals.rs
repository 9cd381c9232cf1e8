use axum::extract::State;
use axum::Json;

use super::{to_withdrawal_response, WithdrawalResponse};
use crate::api::extractors::AuthUser;
use crate::api::ApiError;
use crate::state::AppState;

/// `GET /api/user/withdrawals` — the caller's withdrawals, oldest first.
/// 204 when none exist.
pub(in crate::api) async fn list_withdrawals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<WithdrawalResponse>>, ApiError> {
    let withdrawals = state.service.withdrawals(user_id).await?;
    Ok(Json(
        withdrawals
            .into_iter()
            .map(to_withdrawal_response)
            .collect(),
    ))
}
