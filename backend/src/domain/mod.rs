//! # Domain Module
//!
//! Business rules of the time-tracking and vacation system, independent of
//! HTTP and of how records are stored.
//!
//! ## Module Organization
//!
//! - **duration**: hours worked from clock times, and their text format
//! - **calendar**: working-day counting and the month calendar view
//! - **balance_service**: vacation balance per user and year, request validation
//! - **conflict**: approved-vacation checks for logged days
//! - **vacation_service**: request lifecycle (submit, decide, cancel)
//! - **time_entry_service**: batch logging of worked days
//! - **user_service**: accounts, demo seeding, credential checks
//! - **document_service**: per-employee document metadata and folders
//! - **stats_service** / **report_service**: dashboards, reports, CSV export
//! - **notification**: queued delivery of vacation emails
//!
//! ## Business Rules
//!
//! - Pending and approved requests both reserve vacation days
//! - A request is charged to the year its start date falls in
//! - The working-day count of a request is fixed at submission
//! - A request is decided once, by an administrator
//! - Days inside approved vacation cannot take a time entry

pub mod balance_service;
pub mod calendar;
pub mod conflict;
pub mod document_service;
pub mod duration;
pub mod errors;
pub mod models;
pub mod notification;
pub mod report_service;
pub mod session;
pub mod stats_service;
pub mod time_entry_service;
pub mod user_locks;
pub mod user_service;
pub mod vacation_service;

pub use errors::{DomainError, DomainResult};
pub use session::Session;
