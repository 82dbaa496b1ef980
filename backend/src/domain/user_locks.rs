//! Per-user write serialization.
//!
//! Balance and conflict checks read a user's records and then write based on
//! what they read. Operations hold the user's lock across that sequence so
//! two concurrent submissions cannot both pass validation on the same
//! balance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::errors::DomainResult;
use crate::storage::StoreError;

#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding writes for `user_id`. Callers hold its guard for
    /// the whole read-validate-write sequence.
    pub fn lock_for(&self, user_id: &str) -> DomainResult<Arc<Mutex<()>>> {
        let mut locks = self.locks.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(locks.entry(user_id.to_string()).or_default().clone())
    }
}

/// Acquire a lock obtained from `UserLocks::lock_for`
pub fn acquire(lock: &Mutex<()>) -> DomainResult<MutexGuard<'_, ()>> {
    Ok(lock.lock().map_err(|_| StoreError::Poisoned)?)
}
