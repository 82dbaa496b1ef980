//! # REST API for vacation requests
//!
//! Requests are addressed by owner and id because each employee's
//! requests live in their own collection.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use chrono::{Datelike, Local};
use tracing::{info, warn};

use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::VacationMapper;
use crate::io::rest::session::CurrentSession;
use crate::AppState;
use shared::{
    CancelVacationResponse, DecideVacationRequest, DecideVacationResponse, SubmitVacationRequest,
    SubmitVacationResponse, VacationListResponse, YearQuery,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_own_requests).post(submit_request))
        .route("/all", get(list_all_requests))
        .route("/balance", get(get_balance))
        .route("/:owner/:id/decision", post(decide_request))
        .route("/:owner/:id", delete(cancel_request))
}

pub async fn list_own_requests(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    info!("GET /api/vacations - user: {}", session.user_id);

    match state.vacation_service.list_own(&session) {
        Ok(requests) => {
            let response = VacationListResponse {
                requests: VacationMapper::to_dto_list(requests),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn list_all_requests(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    info!("GET /api/vacations/all");

    match state.vacation_service.list_all(&session) {
        Ok(requests) => {
            let response = VacationListResponse {
                requests: VacationMapper::employee_requests_to_dto(requests),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Failed to list all vacation requests: {}", e);
            ApiError(e).into_response()
        }
    }
}

pub async fn get_balance(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<YearQuery>,
) -> impl IntoResponse {
    let year = query.year.unwrap_or_else(|| Local::now().year());
    info!("GET /api/vacations/balance - user: {}, year: {}", session.user_id, year);

    match state.vacation_service.balance(&session, None, year) {
        Ok(balance) => (StatusCode::OK, Json(VacationMapper::balance_to_dto(balance))).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn submit_request(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<SubmitVacationRequest>,
) -> impl IntoResponse {
    info!("POST /api/vacations - request: {:?}", request);

    match state
        .vacation_service
        .submit(&session, request.start_date, request.end_date, &request.reason)
    {
        Ok(outcome) => {
            let message = format!(
                "Vacation request for {} working day(s) submitted",
                outcome.request.days_requested
            );
            let response = SubmitVacationResponse {
                request: VacationMapper::to_dto(outcome.request, None),
                balance: VacationMapper::balance_to_dto(outcome.balance),
                notification: VacationMapper::notification_to_dto(outcome.notification),
                message,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Vacation request rejected: {}", e);
            ApiError(e).into_response()
        }
    }
}

pub async fn decide_request(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path((owner, id)): Path<(String, String)>,
    Json(request): Json<DecideVacationRequest>,
) -> impl IntoResponse {
    info!("POST /api/vacations/{}/{}/decision - {:?}", owner, id, request.decision);

    let decision = VacationMapper::decision_to_domain(request.decision);
    match state.vacation_service.decide(&session, &owner, &id, decision) {
        Ok(outcome) => {
            let message = format!("Vacation request {}", outcome.request.status);
            let response = DecideVacationResponse {
                request: VacationMapper::to_dto(outcome.request, None),
                notification: VacationMapper::notification_to_dto(outcome.notification),
                message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Decision on {} rejected: {}", id, e);
            ApiError(e).into_response()
        }
    }
}

pub async fn cancel_request(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path((owner, id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/vacations/{}/{}", owner, id);

    match state.vacation_service.cancel(&session, &owner, &id) {
        Ok(()) => {
            let response = CancelVacationResponse {
                success_message: "Vacation request cancelled".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Cancellation of {} rejected: {}", id, e);
            ApiError(e).into_response()
        }
    }
}
