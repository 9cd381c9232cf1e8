use axum::extract::State;
use axum::Json;

use super::{to_order_response, OrderResponse};
use crate::api::extractors::AuthUser;
use crate::api::ApiError;
use crate::state::AppState;

/// `GET /api/user/orders` — the caller's orders, oldest first.
/// 204 when none exist.
pub(in crate::api) async fn list_orders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.service.orders(user_id).await?;
    Ok(Json(orders.into_iter().map(to_order_response).collect()))
}
