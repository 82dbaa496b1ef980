//! # REST API for time reports and their CSV export

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::ReportMapper;
use crate::io::rest::session::CurrentSession;
use crate::AppState;
use shared::TimeReportQuery;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/time", get(time_report))
        .route("/time/export", get(export_time_report))
}

pub async fn time_report(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<TimeReportQuery>,
) -> impl IntoResponse {
    info!("GET /api/reports/time - query: {:?}", query);

    match state
        .report_service
        .time_report(&session, &query.user_id, query.from, query.to)
    {
        Ok(report) => (StatusCode::OK, Json(ReportMapper::time_report_to_dto(report))).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn export_time_report(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<TimeReportQuery>,
) -> impl IntoResponse {
    info!("GET /api/reports/time/export - query: {:?}", query);

    match state
        .report_service
        .export_csv(&session, &query.user_id, query.from, query.to)
    {
        Ok(export) => (StatusCode::OK, Json(ReportMapper::export_to_dto(export))).into_response(),
        Err(e) => {
            error!("Failed to export time report: {}", e);
            ApiError(e).into_response()
        }
    }
}
