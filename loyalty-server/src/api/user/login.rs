use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;

use super::{with_auth_cookie, Credentials};
use crate::api::ApiError;
use crate::state::AppState;

/// `POST /api/user/login` — authenticate and start a session.
pub(in crate::api) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Result<(CookieJar, StatusCode), ApiError> {
    if body.login.is_empty() || body.password.is_empty() {
        return Err(ApiError::MissingCredentials);
    }

    let token = state
        .service
        .authenticate(&body.login, &body.password)
        .await?;

    Ok((
        with_auth_cookie(jar, token, state.auth.token_ttl),
        StatusCode::OK,
    ))
}
