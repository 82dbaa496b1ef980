//! # REST API Interface Layer
//!
//! HTTP endpoints for the timekeeper backend, all mounted under `/api`.
//! Handlers resolve the caller from the `X-User-Id` header, call one domain
//! service, and map its result to a DTO from the `shared` crate. Domain
//! errors become status codes in `error.rs` and nowhere else.

pub mod calendar_apis;
pub mod document_apis;
pub mod error;
pub mod mappers;
pub mod notification_apis;
pub mod report_apis;
pub mod session;
pub mod stats_apis;
pub mod time_entry_apis;
pub mod user_apis;
pub mod vacation_apis;

use axum::Router;

use crate::AppState;

/// Every API route, relative to `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(user_apis::session_router())
        .nest("/employees", user_apis::employee_router())
        .nest("/time-entries", time_entry_apis::router())
        .nest("/vacations", vacation_apis::router())
        .nest("/documents", document_apis::router())
        .nest("/stats", stats_apis::router())
        .nest("/reports", report_apis::router())
        .nest("/calendar", calendar_apis::router())
        .nest("/notifications", notification_apis::router())
}
