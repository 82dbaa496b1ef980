//! # REST API for dashboard statistics

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{Datelike, Local};
use tracing::info;

use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::ReportMapper;
use crate::io::rest::session::CurrentSession;
use crate::AppState;
use shared::StatsQuery;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/employee", get(employee_stats))
        .route("/admin", get(admin_stats))
}

pub async fn employee_stats(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<StatsQuery>,
) -> impl IntoResponse {
    let today = Local::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    info!("GET /api/stats/employee - user: {}, year: {}", session.user_id, year);

    match state.stats_service.employee_dashboard(&session, year, today) {
        Ok(stats) => (StatusCode::OK, Json(ReportMapper::employee_stats_to_dto(stats))).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn admin_stats(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<StatsQuery>,
) -> impl IntoResponse {
    let today = Local::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());
    info!("GET /api/stats/admin - {}-{:02}", year, month);

    match state.stats_service.admin_dashboard(&session, year, month) {
        Ok(stats) => (StatusCode::OK, Json(ReportMapper::admin_stats_to_dto(stats))).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}
