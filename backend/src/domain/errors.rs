use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::models::vacation_request::RequestStatus;
use crate::storage::StoreError;

/// Every recoverable failure a domain operation can report. When an
/// operation fails, nothing it would have written has been persisted.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("End date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Insufficient vacation balance: {requested} days requested, {available} available")]
    InsufficientBalance { requested: u32, available: i64 },

    #[error("Request has already been {from}")]
    InvalidTransition { from: RequestStatus },

    #[error("{0}")]
    Forbidden(String),

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("All {} selected dates fall within approved vacation", skipped.len())]
    AllDatesInVacation { skipped: Vec<NaiveDate> },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl DomainError {
    /// Stable machine-readable name used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::InvalidRange { .. } => "invalid_range",
            DomainError::InsufficientBalance { .. } => "insufficient_balance",
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::NotFound { .. } => "not_found",
            DomainError::Validation(_) => "validation",
            DomainError::Conflict(_) => "conflict",
            DomainError::InvalidCredentials => "invalid_credentials",
            DomainError::AllDatesInVacation { .. } => "all_dates_in_vacation",
            DomainError::Storage(StoreError::NotFound { .. }) => "not_found",
            DomainError::Storage(_) => "storage",
        }
    }

    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            what,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden(message.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_kinds() {
        let err = DomainError::InsufficientBalance {
            requested: 4,
            available: 3,
        };
        assert_eq!(err.kind(), "insufficient_balance");
        assert_eq!(
            err.to_string(),
            "Insufficient vacation balance: 4 days requested, 3 available"
        );

        let err = DomainError::InvalidTransition {
            from: RequestStatus::Approved,
        };
        assert_eq!(err.to_string(), "Request has already been approved");
    }

    #[test]
    fn test_store_not_found_reports_not_found_kind() {
        let err: DomainError = StoreError::NotFound {
            collection: "user".to_string(),
            id: "x".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "not_found");
    }
}
