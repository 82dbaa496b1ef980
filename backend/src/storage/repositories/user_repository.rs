use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{decode_payload, encode_payload};
use crate::domain::models::user::{DomainUser, NewUser, Role};
use crate::storage::error::StoreResult;
use crate::storage::traits::{Collection, RecordStore, StoredRecord};

/// Payload stored for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    email: String,
    password_hash: String,
    name: String,
    role: Role,
    #[serde(default)]
    department: String,
    vacation_days_allotted: u32,
    hire_date: NaiveDate,
}

impl From<&NewUser> for UserRecord {
    fn from(user: &NewUser) -> Self {
        Self {
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            name: user.name.clone(),
            role: user.role,
            department: user.department.clone(),
            vacation_days_allotted: user.vacation_days_allotted,
            hire_date: user.hire_date,
        }
    }
}

impl UserRecord {
    fn into_domain(self, id: String) -> DomainUser {
        DomainUser {
            id,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            role: self.role,
            department: self.department,
            vacation_days_allotted: self.vacation_days_allotted,
            hire_date: self.hire_date,
        }
    }
}

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn RecordStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn decode(record: StoredRecord) -> StoreResult<DomainUser> {
        let payload: UserRecord = decode_payload(&Collection::users(), &record)?;
        Ok(payload.into_domain(record.id))
    }

    /// All users, newest first. Unreadable rows are logged and skipped.
    pub fn list_users(&self) -> StoreResult<Vec<DomainUser>> {
        let records = self.store.list(&Collection::users(), None, true)?;
        Ok(records
            .into_iter()
            .filter_map(|record| match Self::decode(record) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Ignoring unreadable user record: {}", e);
                    None
                }
            })
            .collect())
    }

    pub fn has_users(&self) -> StoreResult<bool> {
        Ok(!self.store.list(&Collection::users(), Some(1), false)?.is_empty())
    }

    pub fn get_user(&self, user_id: &str) -> StoreResult<Option<DomainUser>> {
        self.store
            .get(&Collection::users(), user_id)?
            .map(Self::decode)
            .transpose()
    }

    /// Case-insensitive lookup by email
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<DomainUser>> {
        let wanted = email.trim().to_lowercase();
        Ok(self
            .list_users()?
            .into_iter()
            .find(|user| user.email.to_lowercase() == wanted))
    }

    pub fn create_user(&self, user: &NewUser) -> StoreResult<DomainUser> {
        let record = self
            .store
            .create(&Collection::users(), encode_payload(&UserRecord::from(user))?)?;
        info!("Stored user {} ({})", record.id, user.email);
        Self::decode(record)
    }

    pub fn delete_user(&self, user_id: &str) -> StoreResult<()> {
        self.store.delete(&Collection::users(), user_id)?;
        info!("Deleted user {}", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::memory::InMemoryRecordStore;
    use serde_json::json;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Ana Ruiz".to_string(),
            role,
            department: "Ventas".to_string(),
            vacation_days_allotted: 22,
            hire_date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_create_and_find_by_email() {
        let repo = UserRepository::new(Arc::new(InMemoryRecordStore::new()));
        assert!(!repo.has_users().unwrap());

        let created = repo.create_user(&new_user("Ana@Demo.com", Role::Employee)).unwrap();
        let found = repo.find_by_email(" ana@demo.com ").unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.role, Role::Employee);
        assert!(repo.has_users().unwrap());
    }

    #[test]
    fn test_users_persist_in_csv_store() {
        let env = TestEnvironment::new().unwrap();
        let created = UserRepository::new(env.record_store())
            .create_user(&new_user("admin@demo.com", Role::Admin))
            .unwrap();

        let reopened = UserRepository::new(env.record_store());
        let user = reopened.get_user(&created.id).unwrap().unwrap();
        assert!(user.is_admin());
        assert_eq!(user.hire_date, created.hire_date);
    }

    #[test]
    fn test_unreadable_rows_are_skipped_when_listing() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.create(&Collection::users(), json!({"email": 5})).unwrap();
        let repo = UserRepository::new(store);
        repo.create_user(&new_user("a@demo.com", Role::Employee)).unwrap();

        assert_eq!(repo.list_users().unwrap().len(), 1);
    }
}
