use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Local;
use tracing::info;

use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::ReportMapper;
use crate::io::rest::session::CurrentSession;
use crate::AppState;
use shared::CalendarMonthQuery;

pub fn router() -> Router<AppState> {
    Router::new().route("/month", get(get_calendar_month))
}

/// Six-week grid for a month with logged hours and vacation days
pub async fn get_calendar_month(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<CalendarMonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/month - {}-{:02}", query.year, query.month);

    match state.calendar_service.month_view(
        &session,
        query.user_id.as_deref(),
        query.year,
        query.month,
        Local::now().date_naive(),
    ) {
        Ok(view) => (StatusCode::OK, Json(ReportMapper::calendar_to_dto(view))).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}
