//! Session extraction from the `X-User-Id` request header.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::domain::{DomainError, Session};
use crate::io::rest::error::{unauthorized, ApiError};
use crate::AppState;

pub const SESSION_HEADER: &str = "x-user-id";

/// The caller of a request, resolved from the session header
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| unauthorized("Missing X-User-Id header"))?;

        match state.user_service.session_for(user_id) {
            Ok(session) => Ok(CurrentSession(session)),
            Err(DomainError::NotFound { .. }) => {
                warn!("Session header names unknown user {}", user_id);
                Err(unauthorized("Unknown session"))
            }
            Err(e) => Err(ApiError(e).into_response()),
        }
    }
}
