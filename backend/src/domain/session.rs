//! The authenticated caller of a domain operation.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::user::{DomainUser, Role};

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn for_user(user: &DomainUser) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    pub fn require_admin(&self) -> DomainResult<()> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Employee => Err(DomainError::forbidden("Administrator role required")),
        }
    }

    /// Employees may only touch their own data; administrators anyone's
    pub fn require_self_or_admin(&self, user_id: &str) -> DomainResult<()> {
        if self.is_admin() || self.user_id == user_id {
            Ok(())
        } else {
            Err(DomainError::forbidden("Cannot access another employee's data"))
        }
    }
}
