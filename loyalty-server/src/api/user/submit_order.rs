use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use loyalty_core::service::SubmitOutcome;

use crate::api::extractors::AuthUser;
use crate::api::ApiError;
use crate::state::AppState;

/// `POST /api/user/orders` — submit an order number as a `text/plain` body.
///
/// 202 when newly accepted, 200 when the caller already submitted it,
/// 409 when another user owns it, 422 when the number fails validation.
pub(in crate::api) async fn submit_order(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    headers: HeaderMap,
    body: String,
) -> Result<Response, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("text/plain") {
        return Err(ApiError::InvalidContentType);
    }

    let order_number = body.trim();
    if order_number.is_empty() {
        return Err(ApiError::MissingOrderNumber);
    }

    let response = match state.service.submit_order(user_id, order_number).await? {
        SubmitOutcome::Accepted => StatusCode::ACCEPTED.into_response(),
        SubmitOutcome::AlreadyAccepted => StatusCode::OK.into_response(),
        SubmitOutcome::OwnedByOther => {
            (StatusCode::CONFLICT, "Order has been already created").into_response()
        }
    };

    Ok(response)
}
