//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;

use crate::domain::DomainError;
use crate::storage::StoreError;

pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::InvalidRange { .. }
        | DomainError::InsufficientBalance { .. }
        | DomainError::Validation(_)
        | DomainError::AllDatesInVacation { .. } => StatusCode::BAD_REQUEST,
        DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound { .. } | DomainError::Storage(StoreError::NotFound { .. }) => {
            StatusCode::NOT_FOUND
        }
        DomainError::InvalidTransition { .. } | DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error body for requests that carry no usable session
pub fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "unauthorized".to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = match &self.0 {
            DomainError::Storage(_) => "Storage error".to_string(),
            other => other.to_string(),
        };
        let body = ErrorResponse {
            error: self.0.kind().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
