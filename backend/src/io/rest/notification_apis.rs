use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::ReportMapper;
use crate::io::rest::session::CurrentSession;
use crate::AppState;
use shared::DeliveryLogResponse;

pub fn router() -> Router<AppState> {
    Router::new().route("/deliveries", get(list_deliveries))
}

/// Recent notification delivery attempts, newest first. Administrators only.
pub async fn list_deliveries(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    info!("GET /api/notifications/deliveries");

    if let Err(e) = session.require_admin() {
        return ApiError(e).into_response();
    }

    let response = DeliveryLogResponse {
        deliveries: state
            .notifications
            .deliveries()
            .into_iter()
            .map(ReportMapper::delivery_to_dto)
            .collect(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
