//! # REST API for sessions and employee accounts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use chrono::Local;
use tracing::{error, info, warn};

use crate::domain::user_service::NewEmployee;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::UserMapper;
use crate::io::rest::session::CurrentSession;
use crate::AppState;
use shared::{
    CreateEmployeeRequest, DeleteEmployeeResponse, EmployeeListResponse, LoginRequest, LoginResponse,
};

/// Routes mounted directly under `/api`
pub fn session_router() -> Router<AppState> {
    Router::new()
        .route("/session", post(login))
        .route("/me", get(current_user))
}

/// Routes mounted under `/api/employees`
pub fn employee_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route("/:id", delete(delete_employee))
}

/// Check credentials and return the session identifier
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> impl IntoResponse {
    info!("POST /api/session - email: {}", request.email);

    let session = match state.user_service.authenticate(&request.email, &request.password) {
        Ok(session) => session,
        Err(e) => {
            warn!("Login rejected for {}: {}", request.email, e);
            return ApiError(e).into_response();
        }
    };

    match state.user_service.get_user(&session.user_id) {
        Ok(user) => {
            let response = LoginResponse {
                session_user_id: session.user_id,
                user: UserMapper::to_dto(user),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to load user after login: {}", e);
            ApiError(e).into_response()
        }
    }
}

pub async fn current_user(State(state): State<AppState>, CurrentSession(session): CurrentSession) -> impl IntoResponse {
    info!("GET /api/me - user: {}", session.user_id);

    match state.user_service.get_user(&session.user_id) {
        Ok(user) => (StatusCode::OK, Json(UserMapper::to_dto(user))).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn list_employees(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    info!("GET /api/employees");

    match state.user_service.list_employees(&session) {
        Ok(employees) => {
            let response = EmployeeListResponse {
                employees: UserMapper::to_dto_list(employees),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Failed to list employees: {}", e);
            ApiError(e).into_response()
        }
    }
}

pub async fn create_employee(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<CreateEmployeeRequest>,
) -> impl IntoResponse {
    info!("POST /api/employees - email: {}", request.email);

    let employee = NewEmployee {
        name: request.name,
        email: request.email,
        password: request.password,
        department: request.department,
        vacation_days: request.vacation_days,
    };

    match state
        .user_service
        .create_employee(&session, employee, Local::now().date_naive())
    {
        Ok(user) => (StatusCode::CREATED, Json(UserMapper::to_dto(user))).into_response(),
        Err(e) => {
            warn!("Failed to create employee: {}", e);
            ApiError(e).into_response()
        }
    }
}

pub async fn delete_employee(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/employees/{}", id);

    match state.user_service.delete_employee(&session, &id) {
        Ok(user) => {
            let response = DeleteEmployeeResponse {
                success_message: format!("Employee {} deleted", user.name),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Failed to delete employee {}: {}", id, e);
            ApiError(e).into_response()
        }
    }
}
