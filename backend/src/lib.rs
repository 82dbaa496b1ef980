//! # Timekeeper Backend
//!
//! Non-UI logic for the time tracking and vacation management service.
//!
//! The crate is the orchestration layer that brings together:
//! - **Domain**: working-time arithmetic, vacation balances, the request
//!   lifecycle and the services built on them
//! - **Storage**: the collection-keyed record store and its repositories
//! - **IO**: the REST interface exposed to clients
//!
//! ## Architecture
//!
//! ```text
//! HTTP clients
//!     ↓
//! IO Layer (REST API, mappers)
//!     ↓
//! Domain Layer (services, rules)
//!     ↓
//! Storage Layer (record store, repositories)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use chrono::Local;
use log::info;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, StorageKind};
use crate::domain::calendar::CalendarService;
use crate::domain::document_service::DocumentService;
use crate::domain::notification::{LoggingNotificationSink, NotificationDispatcher};
use crate::domain::report_service::ReportService;
use crate::domain::stats_service::StatsService;
use crate::domain::time_entry_service::TimeEntryService;
use crate::domain::user_locks::UserLocks;
use crate::domain::user_service::UserService;
use crate::domain::vacation_service::VacationService;
use crate::io::rest::session::SESSION_HEADER;
use crate::storage::{
    CsvConnection, CsvRecordStore, DocumentRepository, InMemoryRecordStore, RecordStore,
    TimeEntryRepository, UserRepository, VacationRequestRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub time_entry_service: TimeEntryService,
    pub vacation_service: VacationService,
    pub document_service: DocumentService,
    pub stats_service: StatsService,
    pub report_service: ReportService,
    pub calendar_service: CalendarService,
    pub notifications: NotificationDispatcher,
}

/// Open the record store selected by the configuration
pub fn open_record_store(config: &AppConfig) -> Result<Arc<dyn RecordStore>> {
    match config.storage {
        StorageKind::Csv => {
            let connection = CsvConnection::new(&config.data_directory)
                .with_context(|| format!("Failed to open data directory {:?}", config.data_directory))?;
            info!("Using CSV storage in {}", connection.base_directory().display());
            Ok(Arc::new(CsvRecordStore::new(connection)))
        }
        StorageKind::Memory => {
            info!("Using in-memory storage; nothing will survive a restart");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
    }
}

/// Initialize the backend with all required services.
///
/// Must run inside a tokio runtime when notifications are enabled, since the
/// delivery worker is spawned here.
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up storage");
    let store = open_record_store(config)?;
    let users = UserRepository::new(store.clone());
    let entries = TimeEntryRepository::new(store.clone());
    let vacations = VacationRequestRepository::new(store.clone());
    let documents = DocumentRepository::new(store);

    info!("Setting up notifications");
    let notifications = if config.notifications.enabled {
        NotificationDispatcher::start(
            Arc::new(LoggingNotificationSink),
            config.notifications.admin_email.clone(),
            config.notifications.delivery_log_capacity,
        )
    } else {
        info!("Notifications are disabled");
        NotificationDispatcher::disabled()
    };

    info!("Setting up domain model");
    let locks = UserLocks::new();
    let user_service = UserService::new(users.clone(), config.default_vacation_days);
    let time_entry_service = TimeEntryService::new(
        entries.clone(),
        vacations.clone(),
        locks.clone(),
        config.max_break_minutes,
    );
    let vacation_service = VacationService::new(
        users.clone(),
        vacations.clone(),
        notifications.clone(),
        locks,
    );
    let document_service = DocumentService::new(documents, users.clone());
    let stats_service = StatsService::new(users.clone(), entries.clone(), vacations.clone());
    let report_service = ReportService::new(users, entries.clone());
    let calendar_service = CalendarService::new(entries, vacations);

    if config.seed_demo_users {
        user_service
            .seed_demo_users(Local::now().date_naive())
            .context("Failed to seed demo accounts")?;
    }

    info!("Setting up application state");
    Ok(AppState {
        user_service,
        time_entry_service,
        vacation_service,
        document_service,
        stats_service,
        report_service,
        calendar_service,
        notifications,
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid allowed origin '{}'", allowed_origin))?;

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(SESSION_HEADER)]);

    Ok(Router::new()
        .nest("/api", io::api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
