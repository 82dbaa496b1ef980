//! # REST API for time entries

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{info, warn};

use crate::domain::duration::{format_time, round_hours};
use crate::domain::time_entry_service::{TimeEntryService, TimeEntrySubmission};
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::TimeEntryMapper;
use crate::io::rest::session::CurrentSession;
use crate::AppState;
use shared::{
    HoursPreviewQuery, HoursPreviewResponse, SkippedDate, SubmitTimeEntriesRequest,
    SubmitTimeEntriesResponse, TimeEntryListQuery, TimeEntryListResponse,
};

const VACATION_SKIP_REASON: &str = "Approved vacation";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries).post(submit_entries))
        .route("/hours", get(preview_hours))
}

pub async fn list_entries(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<TimeEntryListQuery>,
) -> impl IntoResponse {
    info!("GET /api/time-entries - query: {:?}", query);

    match state
        .time_entry_service
        .list_entries(&session, query.user_id.as_deref(), query.from, query.to)
    {
        Ok(entries) => {
            let response = TimeEntryListResponse {
                entries: TimeEntryMapper::to_dto_list(entries),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn submit_entries(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<SubmitTimeEntriesRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/time-entries - {} dates, {}-{}",
        request.dates.len(),
        request.start_time,
        request.end_time
    );

    let submission = TimeEntrySubmission {
        dates: request.dates,
        start_time: request.start_time,
        end_time: request.end_time,
        break_minutes: request.break_minutes,
        notes: request.notes,
    };

    match state.time_entry_service.submit_entries(&session, submission) {
        Ok(result) => {
            let saved_count = result.saved.len();
            let mut message = format!("Saved {} day(s)", saved_count);
            if !result.replaced_dates.is_empty() {
                message.push_str(&format!(", {} replaced", result.replaced_dates.len()));
            }
            if !result.skipped.is_empty() {
                message.push_str(&format!(
                    "; skipped {} day(s) in approved vacation",
                    result.skipped.len()
                ));
            }

            let response = SubmitTimeEntriesResponse {
                saved: TimeEntryMapper::to_dto_list(result.saved),
                replaced_dates: result.replaced_dates,
                skipped: result
                    .skipped
                    .into_iter()
                    .map(|date| SkippedDate {
                        date,
                        reason: VACATION_SKIP_REASON.to_string(),
                    })
                    .collect(),
                hours_per_day: round_hours(result.hours_per_day),
                hours_per_day_formatted: format_time(result.hours_per_day),
                total_hours_formatted: format_time(result.hours_per_day * saved_count as f64),
                message,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Time entry submission rejected: {}", e);
            ApiError(e).into_response()
        }
    }
}

/// Hours for the given times, without saving anything
pub async fn preview_hours(Query(query): Query<HoursPreviewQuery>) -> impl IntoResponse {
    let days = query.days.unwrap_or(1);
    let preview = TimeEntryService::preview_hours(
        &query.start_time,
        &query.end_time,
        query.break_minutes.unwrap_or(0),
        days,
    );

    let response = HoursPreviewResponse {
        hours_per_day: round_hours(preview.hours_per_day),
        hours_per_day_formatted: format_time(preview.hours_per_day),
        total_formatted: format_time(preview.total_hours),
    };
    (StatusCode::OK, Json(response)).into_response()
}
