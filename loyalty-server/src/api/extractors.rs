//! Request authentication.
//!
//! `AuthUser` reads the `auth_token` cookie, verifies the HS256 signature
//! and expiry, and hands the handler the authenticated user id. Missing,
//! invalid or expired tokens are all 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use loyalty_core::auth;

use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

pub struct AuthUser(pub i64);

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(AUTH_COOKIE).ok_or(AuthError::MissingToken)?;

        let user_id = auth::verify_token(&state.auth.jwt_secret, cookie.value())
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser(user_id))
    }
}
