//! In-memory record store.
//!
//! Collections are kept in a `BTreeMap` keyed by collection name. Each
//! collection holds its records newest first; creates insert at the front.

use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::error::{StoreError, StoreResult};
use super::traits::{Collection, RecordStore, StoredRecord};

#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    collections: Arc<Mutex<BTreeMap<Collection, Vec<StoredRecord>>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, BTreeMap<Collection, Vec<StoredRecord>>>> {
        self.collections.lock().map_err(|_| StoreError::Poisoned)
    }

    fn not_found(collection: &Collection, id: &str) -> StoreError {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

impl RecordStore for InMemoryRecordStore {
    fn list(
        &self,
        collection: &Collection,
        limit: Option<usize>,
        include_data: bool,
    ) -> StoreResult<Vec<StoredRecord>> {
        let collections = self.lock()?;
        let records = match collections.get(collection) {
            Some(records) => records,
            None => return Ok(Vec::new()),
        };

        let limit = limit.unwrap_or(records.len());
        Ok(records
            .iter()
            .take(limit)
            .cloned()
            .map(|record| if include_data { record } else { record.without_data() })
            .collect())
    }

    fn create(&self, collection: &Collection, data: Value) -> StoreResult<StoredRecord> {
        if !data.is_object() {
            return Err(StoreError::InvalidPayload);
        }
        let record = StoredRecord::new(data);
        let mut collections = self.lock()?;
        collections
            .entry(collection.clone())
            .or_default()
            .insert(0, record.clone());
        debug!("Created record {} in {}", record.id, collection);
        Ok(record)
    }

    fn update(&self, collection: &Collection, id: &str, partial: Value) -> StoreResult<StoredRecord> {
        let mut collections = self.lock()?;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|record| record.id == id))
            .ok_or_else(|| Self::not_found(collection, id))?;

        record.merge(partial)?;
        debug!("Updated record {} in {}", id, collection);
        Ok(record.clone())
    }

    fn delete(&self, collection: &Collection, id: &str) -> StoreResult<()> {
        let mut collections = self.lock()?;
        let records = collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection, id))?;

        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(Self::not_found(collection, id));
        }
        debug!("Deleted record {} from {}", id, collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_returns_newest_first() {
        let store = InMemoryRecordStore::new();
        let users = Collection::users();
        let first = store.create(&users, json!({"name": "Ana"})).unwrap();
        let second = store.create(&users, json!({"name": "Luis"})).unwrap();

        let listed = store.list(&users, None, true).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn test_list_respects_limit_and_include_data() {
        let store = InMemoryRecordStore::new();
        let users = Collection::users();
        for n in 0..5 {
            store.create(&users, json!({"n": n})).unwrap();
        }

        let listed = store.list(&users, Some(2), false).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r.data.is_null()));
    }

    #[test]
    fn test_collections_are_isolated() {
        let store = InMemoryRecordStore::new();
        store
            .create(&Collection::time_entries("a"), json!({"date": "2024-01-02"}))
            .unwrap();

        assert!(store.list(&Collection::time_entries("b"), None, true).unwrap().is_empty());
    }

    #[test]
    fn test_update_and_delete_missing_record() {
        let store = InMemoryRecordStore::new();
        let users = Collection::users();

        let update = store.update(&users, "missing", json!({"a": 1}));
        assert!(matches!(update, Err(StoreError::NotFound { .. })));

        store.create(&users, json!({"a": 1})).unwrap();
        let delete = store.delete(&users, "missing");
        assert!(matches!(delete, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_update_merges_and_delete_removes() {
        let store = InMemoryRecordStore::new();
        let requests = Collection::vacation_requests("u1");
        let record = store
            .create(&requests, json!({"status": "pending", "days_requested": 3}))
            .unwrap();

        let updated = store
            .update(&requests, &record.id, json!({"status": "approved"}))
            .unwrap();
        assert_eq!(updated.data["status"], "approved");
        assert_eq!(updated.data["days_requested"], 3);

        store.delete(&requests, &record.id).unwrap();
        assert!(store.get(&requests, &record.id).unwrap().is_none());
    }
}
