use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use super::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
struct PingResponse {
    status: &'static str,
}

/// `GET /ping` — storage connectivity check.
pub(super) async fn ping(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.service.ping().await?;
    Ok(Json(PingResponse { status: "ok" }))
}
