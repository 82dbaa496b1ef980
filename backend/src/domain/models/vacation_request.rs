use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a vacation request.
///
/// Requests start `Pending` and move exactly once to `Approved` or
/// `Rejected`; both of those are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Pending and approved requests both count against the balance
    pub fn counts_against_balance(self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Administrator verdict on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn resulting_status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainVacationRequest {
    pub id: String,
    pub user_id: String,
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    /// Working days computed at submission; never recomputed
    pub days_requested: u32,
    pub reason: String,
    pub status: RequestStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DomainVacationRequest {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// A request as listed for administrators, with the owner's name attached
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeVacationRequest {
    pub request: DomainVacationRequest,
    pub employee_name: String,
}

/// Fields of a request about to be stored
#[derive(Debug, Clone)]
pub struct NewVacationRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: u32,
    pub reason: String,
}
