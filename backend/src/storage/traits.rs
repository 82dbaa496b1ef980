//! # Storage Traits
//!
//! This module defines the storage abstraction that lets the domain layer
//! work against an in-memory store or the CSV file store interchangeably.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::error::{StoreError, StoreResult};

/// Name of a bucket of records, optionally scoped to one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Collection(String);

impl Collection {
    pub const USERS: &'static str = "user";
    pub const TIME_ENTRIES: &'static str = "time_entry";
    pub const VACATION_REQUESTS: &'static str = "vacation_request";
    pub const DOCUMENTS: &'static str = "document";

    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn users() -> Self {
        Self::named(Self::USERS)
    }

    pub fn time_entries(user_id: &str) -> Self {
        Self::scoped(Self::TIME_ENTRIES, user_id)
    }

    pub fn vacation_requests(user_id: &str) -> Self {
        Self::scoped(Self::VACATION_REQUESTS, user_id)
    }

    pub fn documents(user_id: &str) -> Self {
        Self::scoped(Self::DOCUMENTS, user_id)
    }

    fn scoped(kind: &str, user_id: &str) -> Self {
        Self(format!("{}:{}", kind, user_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(kind, owner)`; unscoped collections have no owner.
    pub fn parts(&self) -> (&str, Option<&str>) {
        match self.0.split_once(':') {
            Some((kind, owner)) => (kind, Some(owner)),
            None => (self.0.as_str(), None),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Envelope the store wraps around every payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    /// `Value::Null` when listed without data
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    pub fn new(data: Value) -> Self {
        Self {
            id: generate_record_id(),
            data,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Shallow-merge `partial` into this record's data.
    pub fn merge(&mut self, partial: Value) -> StoreResult<()> {
        let Value::Object(fields) = partial else {
            return Err(StoreError::InvalidPayload);
        };
        let Value::Object(existing) = &mut self.data else {
            return Err(StoreError::InvalidPayload);
        };
        for (key, value) in fields {
            existing.insert(key, value);
        }
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub(crate) fn without_data(mut self) -> Self {
        self.data = Value::Null;
        self
    }
}

pub fn generate_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Collection-based record persistence.
///
/// Listing returns the newest records first. Implementations never filter
/// by content; callers list and filter.
pub trait RecordStore: Send + Sync {
    /// List up to `limit` records of a collection, newest first
    fn list(
        &self,
        collection: &Collection,
        limit: Option<usize>,
        include_data: bool,
    ) -> StoreResult<Vec<StoredRecord>>;

    /// Create a record with a fresh id and creation timestamp
    fn create(&self, collection: &Collection, data: Value) -> StoreResult<StoredRecord>;

    /// Merge `partial` into an existing record.
    /// Fails with `StoreError::NotFound` if the id is absent.
    fn update(&self, collection: &Collection, id: &str, partial: Value) -> StoreResult<StoredRecord>;

    /// Remove a record. Fails with `StoreError::NotFound` if the id is absent.
    fn delete(&self, collection: &Collection, id: &str) -> StoreResult<()>;

    /// Fetch a single record by id
    fn get(&self, collection: &Collection, id: &str) -> StoreResult<Option<StoredRecord>> {
        Ok(self
            .list(collection, None, true)?
            .into_iter()
            .find(|record| record.id == id))
    }
}
