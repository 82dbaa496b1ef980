use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of account roles. Fixed when the account is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainUser {
    pub id: String,
    pub email: String,
    /// PHC-format argon2 hash
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub department: String,
    pub vacation_days_allotted: u32,
    pub hire_date: NaiveDate,
}

impl DomainUser {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Input for a user that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub department: String,
    pub vacation_days_allotted: u32,
    pub hire_date: NaiveDate,
}
