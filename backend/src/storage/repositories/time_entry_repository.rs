use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{decode_payload, encode_payload};
use crate::domain::duration::{format_time_of_day, parse_time_of_day};
use crate::domain::models::time_entry::{DomainTimeEntry, TimeEntryFields};
use crate::storage::error::{StoreError, StoreResult};
use crate::storage::traits::{Collection, RecordStore, StoredRecord};

/// Payload stored for a time entry. Times are kept as `HH:MM` text.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TimeEntryRecord {
    user_id: String,
    date: NaiveDate,
    start_time: String,
    end_time: String,
    #[serde(default)]
    break_minutes: u32,
    #[serde(default)]
    notes: String,
}

impl TimeEntryRecord {
    fn new(user_id: &str, fields: &TimeEntryFields) -> Self {
        Self {
            user_id: user_id.to_string(),
            date: fields.date,
            start_time: format_time_of_day(fields.start_time),
            end_time: format_time_of_day(fields.end_time),
            break_minutes: fields.break_minutes,
            notes: fields.notes.clone(),
        }
    }

    fn into_domain(self, id: String, collection: &Collection) -> StoreResult<DomainTimeEntry> {
        let parse = |value: &str| {
            parse_time_of_day(value).ok_or_else(|| StoreError::Corrupt {
                collection: collection.to_string(),
                reason: format!("entry {}: bad time '{}'", id, value),
            })
        };

        let start_time = parse(&self.start_time)?;
        let end_time = parse(&self.end_time)?;

        Ok(DomainTimeEntry {
            id,
            start_time,
            end_time,
            user_id: self.user_id,
            date: self.date,
            break_minutes: self.break_minutes,
            notes: self.notes,
        })
    }
}

#[derive(Clone)]
pub struct TimeEntryRepository {
    store: Arc<dyn RecordStore>,
}

impl TimeEntryRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn decode(collection: &Collection, record: StoredRecord) -> StoreResult<DomainTimeEntry> {
        let payload: TimeEntryRecord = decode_payload(collection, &record)?;
        payload.into_domain(record.id, collection)
    }

    /// Every entry of one user, newest record first
    pub fn list_entries(&self, user_id: &str) -> StoreResult<Vec<DomainTimeEntry>> {
        let collection = Collection::time_entries(user_id);
        let records = self.store.list(&collection, None, true)?;
        Ok(records
            .into_iter()
            .filter_map(|record| match Self::decode(&collection, record) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Ignoring unreadable time entry: {}", e);
                    None
                }
            })
            .collect())
    }

    pub fn create_entry(&self, user_id: &str, fields: &TimeEntryFields) -> StoreResult<DomainTimeEntry> {
        let collection = Collection::time_entries(user_id);
        let payload = encode_payload(&TimeEntryRecord::new(user_id, fields))?;
        let record = self.store.create(&collection, payload)?;
        debug!("Created time entry {} for {} on {}", record.id, user_id, fields.date);
        Self::decode(&collection, record)
    }

    /// Overwrite the fields of an existing entry
    pub fn update_entry(
        &self,
        user_id: &str,
        entry_id: &str,
        fields: &TimeEntryFields,
    ) -> StoreResult<DomainTimeEntry> {
        let collection = Collection::time_entries(user_id);
        let payload = encode_payload(&TimeEntryRecord::new(user_id, fields))?;
        let record = self.store.update(&collection, entry_id, payload)?;
        debug!("Replaced time entry {} for {} on {}", entry_id, user_id, fields.date);
        Self::decode(&collection, record)
    }
}
