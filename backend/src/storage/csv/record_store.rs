//! # CSV Record Store
//!
//! File-backed `RecordStore`. Each collection is one CSV file:
//!
//! ```csv
//! id,created_at,updated_at,data
//! 3f2a...,2024-01-15T10:30:00Z,,"{""date"":""2024-01-15"",""start_time"":""09:00""}"
//! ```
//!
//! Rows are stored oldest first and listed newest first. Creates append a
//! row; updates and deletes rewrite the file through a temp file and rename.
//! Rows that fail to decode are left out of listings but written back
//! byte-for-byte on every rewrite.

use chrono::{DateTime, Utc};
use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::sync::{Arc, Mutex, MutexGuard};

use super::connection::CsvConnection;
use crate::storage::error::{StoreError, StoreResult};
use crate::storage::traits::{Collection, RecordStore, StoredRecord};

const COLUMNS: [&str; 4] = ["id", "created_at", "updated_at", "data"];

/// On-disk row shape
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordRow {
    id: String,
    created_at: String,
    updated_at: String,
    data: String,
}

impl RecordRow {
    fn from_record(record: &StoredRecord) -> StoreResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record
                .updated_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
            data: serde_json::to_string(&record.data)?,
        })
    }

    fn into_record(self, collection: &Collection) -> StoreResult<StoredRecord> {
        let corrupt = |reason: String| StoreError::Corrupt {
            collection: collection.to_string(),
            reason,
        };

        let created_at = parse_timestamp(&self.created_at)
            .ok_or_else(|| corrupt(format!("bad created_at '{}'", self.created_at)))?;
        let updated_at = if self.updated_at.is_empty() {
            None
        } else {
            Some(
                parse_timestamp(&self.updated_at)
                    .ok_or_else(|| corrupt(format!("bad updated_at '{}'", self.updated_at)))?,
            )
        };

        Ok(StoredRecord {
            id: self.id,
            data: serde_json::from_str(&self.data)?,
            created_at,
            updated_at,
        })
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// A row as found in the file
enum DiskRow {
    Record(StoredRecord),
    Unreadable(ByteRecord),
}

impl DiskRow {
    fn is_record(&self, id: &str) -> bool {
        matches!(self, DiskRow::Record(record) if record.id == id)
    }
}

#[derive(Clone)]
pub struct CsvRecordStore {
    connection: CsvConnection,
    write_lock: Arc<Mutex<()>>,
}

impl CsvRecordStore {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn connection(&self) -> &CsvConnection {
        &self.connection
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Read every row of a collection, oldest first
    fn read_rows(&self, collection: &Collection) -> StoreResult<Vec<DiskRow>> {
        let file_path = self.connection.get_collection_file_path(collection);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(BufReader::new(file));
        let headers = csv_reader.byte_headers()?.clone();

        let mut rows = Vec::new();
        for raw in csv_reader.byte_records() {
            let raw = raw?;
            let decoded = raw
                .deserialize::<RecordRow>(Some(&headers))
                .map_err(StoreError::from)
                .and_then(|row| row.into_record(collection));
            match decoded {
                Ok(record) => rows.push(DiskRow::Record(record)),
                Err(e) => {
                    warn!("Skipping unreadable row in {:?}: {}", file_path, e);
                    rows.push(DiskRow::Unreadable(raw));
                }
            }
        }

        Ok(rows)
    }

    /// Decodable records of a collection, oldest first
    fn read_records(&self, collection: &Collection) -> StoreResult<Vec<StoredRecord>> {
        Ok(self
            .read_rows(collection)?
            .into_iter()
            .filter_map(|row| match row {
                DiskRow::Record(record) => Some(record),
                DiskRow::Unreadable(_) => None,
            })
            .collect())
    }

    /// Rewrite a whole collection file atomically
    fn write_rows(&self, collection: &Collection, rows: &[DiskRow]) -> StoreResult<()> {
        let file_path = self.connection.ensure_collection_file_exists(collection)?;
        let temp_file_path = file_path.with_extension("csv.tmp");

        {
            let temp_file = File::create(&temp_file_path)?;
            let mut csv_writer = WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_writer(BufWriter::new(temp_file));

            csv_writer.write_record(COLUMNS)?;
            for row in rows {
                match row {
                    DiskRow::Record(record) => csv_writer.serialize(RecordRow::from_record(record)?)?,
                    DiskRow::Unreadable(raw) => csv_writer.write_byte_record(raw)?,
                }
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_file_path, &file_path)?;
        debug!("Wrote {} rows to {:?}", rows.len(), file_path);
        Ok(())
    }

    fn append_record(&self, collection: &Collection, record: &StoredRecord) -> StoreResult<()> {
        let file_path = self.connection.ensure_collection_file_exists(collection)?;
        let file = OpenOptions::new().append(true).open(&file_path)?;

        // Header already present; append data rows only
        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(file);
        csv_writer.serialize(RecordRow::from_record(record)?)?;
        csv_writer.flush()?;

        debug!("Appended record {} to {:?}", record.id, file_path);
        Ok(())
    }

    fn not_found(collection: &Collection, id: &str) -> StoreError {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

impl RecordStore for CsvRecordStore {
    fn list(
        &self,
        collection: &Collection,
        limit: Option<usize>,
        include_data: bool,
    ) -> StoreResult<Vec<StoredRecord>> {
        let _guard = self.lock()?;
        let records = self.read_records(collection)?;
        let limit = limit.unwrap_or(records.len());

        Ok(records
            .into_iter()
            .rev()
            .take(limit)
            .map(|record| if include_data { record } else { record.without_data() })
            .collect())
    }

    fn create(&self, collection: &Collection, data: Value) -> StoreResult<StoredRecord> {
        if !data.is_object() {
            return Err(StoreError::InvalidPayload);
        }
        let _guard = self.lock()?;
        let record = StoredRecord::new(data);
        self.append_record(collection, &record)?;
        Ok(record)
    }

    fn update(&self, collection: &Collection, id: &str, partial: Value) -> StoreResult<StoredRecord> {
        let _guard = self.lock()?;
        let mut rows = self.read_rows(collection)?;

        let record = rows
            .iter_mut()
            .find_map(|row| match row {
                DiskRow::Record(record) if record.id == id => Some(record),
                _ => None,
            })
            .ok_or_else(|| Self::not_found(collection, id))?;
        record.merge(partial)?;
        let updated = record.clone();

        self.write_rows(collection, &rows)?;
        Ok(updated)
    }

    fn delete(&self, collection: &Collection, id: &str) -> StoreResult<()> {
        let _guard = self.lock()?;
        let mut rows = self.read_rows(collection)?;

        let before = rows.len();
        rows.retain(|row| !row.is_record(id));
        if rows.len() == before {
            return Err(Self::not_found(collection, id));
        }

        self.write_rows(collection, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_create_and_list_round_trip_through_file() -> anyhow::Result<()> {
        let env = TestEnvironment::new()?;
        let store = CsvRecordStore::new(env.connection.clone());
        let entries = Collection::time_entries("u1");

        let first = store.create(&entries, json!({"date": "2024-01-02", "notes": "a, \"quoted\" note"}))?;
        let second = store.create(&entries, json!({"date": "2024-01-03"}))?;

        let listed = store.list(&entries, None, true)?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(listed[1].data["notes"], "a, \"quoted\" note");
        Ok(())
    }

    #[test]
    fn test_records_survive_reopening_the_store() -> anyhow::Result<()> {
        let env = TestEnvironment::new()?;
        let users = Collection::users();
        let created = CsvRecordStore::new(env.connection.clone())
            .create(&users, json!({"email": "ana@demo.com"}))?;

        let reopened = CsvRecordStore::new(CsvConnection::new(&env.base_path)?);
        let found = reopened.get(&users, &created.id)?.expect("record should persist");
        assert_eq!(found.data["email"], "ana@demo.com");
        assert_eq!(found.created_at.timestamp(), created.created_at.timestamp());
        Ok(())
    }

    #[test]
    fn test_update_rewrites_and_keeps_other_rows() -> anyhow::Result<()> {
        let env = TestEnvironment::new()?;
        let store = CsvRecordStore::new(env.connection.clone());
        let requests = Collection::vacation_requests("u1");

        let keep = store.create(&requests, json!({"status": "pending"}))?;
        let change = store.create(&requests, json!({"status": "pending"}))?;
        store.update(&requests, &change.id, json!({"status": "rejected"}))?;

        let listed = store.list(&requests, None, true)?;
        assert_eq!(listed.len(), 2);
        let changed = listed.iter().find(|r| r.id == change.id).unwrap();
        let kept = listed.iter().find(|r| r.id == keep.id).unwrap();
        assert_eq!(changed.data["status"], "rejected");
        assert!(changed.updated_at.is_some());
        assert_eq!(kept.data["status"], "pending");
        Ok(())
    }

    #[test]
    fn test_delete_missing_record_is_not_found() -> anyhow::Result<()> {
        let env = TestEnvironment::new()?;
        let store = CsvRecordStore::new(env.connection.clone());
        let docs = Collection::documents("u1");
        let record = store.create(&docs, json!({"file_name": "nomina.pdf"}))?;

        assert!(matches!(
            store.delete(&docs, "nope"),
            Err(StoreError::NotFound { .. })
        ));
        store.delete(&docs, &record.id)?;
        assert!(store.list(&docs, None, true)?.is_empty());
        Ok(())
    }

    const LEGACY_ROW: &str = "legacy,not-a-date,,\"{\"\"status\"\":\"\"pending\"\"}\"\n";

    fn append_legacy_row(store: &CsvRecordStore, collection: &Collection) -> anyhow::Result<std::path::PathBuf> {
        let path = store.connection().ensure_collection_file_exists(collection)?;
        OpenOptions::new().append(true).open(&path)?.write_all(LEGACY_ROW.as_bytes())?;
        Ok(path)
    }

    #[test]
    fn test_update_keeps_unreadable_rows() -> anyhow::Result<()> {
        let env = TestEnvironment::new()?;
        let store = CsvRecordStore::new(env.connection.clone());
        let requests = Collection::vacation_requests("u1");

        let record = store.create(&requests, json!({"status": "pending"}))?;
        let path = append_legacy_row(&store, &requests)?;
        assert_eq!(store.list(&requests, None, true)?.len(), 1);

        store.update(&requests, &record.id, json!({"status": "approved"}))?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content.lines().count(), 3);
        assert!(content.ends_with(LEGACY_ROW));
        assert_eq!(store.get(&requests, &record.id)?.unwrap().data["status"], "approved");
        Ok(())
    }

    #[test]
    fn test_delete_keeps_unreadable_rows() -> anyhow::Result<()> {
        let env = TestEnvironment::new()?;
        let store = CsvRecordStore::new(env.connection.clone());
        let requests = Collection::vacation_requests("u1");

        let record = store.create(&requests, json!({"status": "pending"}))?;
        let path = append_legacy_row(&store, &requests)?;

        assert!(matches!(
            store.delete(&requests, "legacy"),
            Err(StoreError::NotFound { .. })
        ));
        store.delete(&requests, &record.id)?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content, format!("id,created_at,updated_at,data\n{}", LEGACY_ROW));
        Ok(())
    }

    #[test]
    fn test_listing_unknown_collection_is_empty() -> anyhow::Result<()> {
        let env = TestEnvironment::new()?;
        let store = CsvRecordStore::new(env.connection.clone());
        assert!(store.list(&Collection::named("nothing"), Some(10), true)?.is_empty());
        Ok(())
    }
}
