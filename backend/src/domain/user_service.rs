use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::NaiveDate;
use log::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::user::{DomainUser, NewUser, Role};
use crate::domain::session::Session;
use crate::storage::UserRepository;

/// Accounts created on an empty store so the system can be tried out
const DEMO_ACCOUNTS: [(&str, &str, &str, Role, &str); 2] = [
    ("admin@demo.com", "admin123", "Administrador", Role::Admin, "Dirección"),
    ("empleado@demo.com", "demo123", "Empleado Demo", Role::Employee, "Operaciones"),
];

pub fn hash_password(password: &str) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::validation(format!("Could not hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    match PasswordHash::new(hashed) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

/// Fields for a new employee account
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    pub vacation_days: Option<u32>,
}

/// Service for accounts and sessions
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    default_vacation_days: u32,
}

impl UserService {
    pub fn new(users: UserRepository, default_vacation_days: u32) -> Self {
        Self {
            users,
            default_vacation_days,
        }
    }

    /// Create the demo administrator and employee when no user exists yet.
    /// Returns how many accounts were created.
    pub fn seed_demo_users(&self, today: NaiveDate) -> DomainResult<usize> {
        if self.users.has_users()? {
            info!("Users already present; skipping demo seed");
            return Ok(0);
        }

        for (email, password, name, role, department) in DEMO_ACCOUNTS {
            self.users.create_user(&NewUser {
                email: email.to_string(),
                password_hash: hash_password(password)?,
                name: name.to_string(),
                role,
                department: department.to_string(),
                vacation_days_allotted: self.default_vacation_days,
                hire_date: today,
            })?;
        }

        info!("Seeded {} demo accounts", DEMO_ACCOUNTS.len());
        Ok(DEMO_ACCOUNTS.len())
    }

    pub fn authenticate(&self, email: &str, password: &str) -> DomainResult<Session> {
        let user = self
            .users
            .find_by_email(email)?
            .ok_or(DomainError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            warn!("Failed login for {}", email.trim());
            return Err(DomainError::InvalidCredentials);
        }

        info!("User {} logged in as {}", user.id, user.role);
        Ok(Session::for_user(&user))
    }

    /// Resolve a session for an already identified user id
    pub fn session_for(&self, user_id: &str) -> DomainResult<Session> {
        let user = self.get_user(user_id)?;
        Ok(Session::for_user(&user))
    }

    pub fn get_user(&self, user_id: &str) -> DomainResult<DomainUser> {
        self.users
            .get_user(user_id)?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    /// Employees (administrators excluded), sorted by name
    pub fn list_employees(&self, session: &Session) -> DomainResult<Vec<DomainUser>> {
        session.require_admin()?;

        let mut employees: Vec<DomainUser> = self
            .users
            .list_users()?
            .into_iter()
            .filter(|user| user.role == Role::Employee)
            .collect();
        employees.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(employees)
    }

    pub fn create_employee(
        &self,
        session: &Session,
        employee: NewEmployee,
        today: NaiveDate,
    ) -> DomainResult<DomainUser> {
        session.require_admin()?;
        info!("Creating employee: name={}, email={}", employee.name, employee.email);

        let name = employee.name.trim();
        let email = employee.email.trim().to_lowercase();
        if name.is_empty() {
            return Err(DomainError::validation("Name cannot be empty"));
        }
        if !email.contains('@') {
            return Err(DomainError::validation("Email address is not valid"));
        }
        if employee.password.is_empty() {
            return Err(DomainError::validation("Password cannot be empty"));
        }
        if self.users.find_by_email(&email)?.is_some() {
            return Err(DomainError::Conflict(format!("A user with email {} already exists", email)));
        }

        let user = self.users.create_user(&NewUser {
            email,
            password_hash: hash_password(&employee.password)?,
            name: name.to_string(),
            role: Role::Employee,
            department: employee.department.trim().to_string(),
            vacation_days_allotted: employee.vacation_days.unwrap_or(self.default_vacation_days),
            hire_date: today,
        })?;

        info!("Created employee {} with ID {}", user.name, user.id);
        Ok(user)
    }

    /// Remove an employee account. Their entries, requests and documents
    /// stay in the store.
    pub fn delete_employee(&self, session: &Session, user_id: &str) -> DomainResult<DomainUser> {
        session.require_admin()?;

        let user = self.get_user(user_id)?;
        if user.is_admin() {
            return Err(DomainError::validation("Administrator accounts cannot be deleted"));
        }

        self.users.delete_user(user_id)?;
        info!("Deleted employee {} ({})", user.name, user.id);
        Ok(user)
    }
}
