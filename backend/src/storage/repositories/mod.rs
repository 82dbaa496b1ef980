//! Typed repositories over the record store.
//!
//! Each repository owns the on-store payload shape for one kind of record
//! and converts between that payload and the domain model. The store only
//! knows collections and JSON objects; filtering happens here or above.

pub mod document_repository;
pub mod time_entry_repository;
pub mod user_repository;
pub mod vacation_request_repository;

pub use document_repository::DocumentRepository;
pub use time_entry_repository::TimeEntryRepository;
pub use user_repository::UserRepository;
pub use vacation_request_repository::VacationRequestRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::{StoreError, StoreResult};
use super::traits::{Collection, StoredRecord};

/// Decode the payload of a stored record, reporting which collection held
/// the bad row.
pub(crate) fn decode_payload<T: DeserializeOwned>(
    collection: &Collection,
    record: &StoredRecord,
) -> StoreResult<T> {
    serde_json::from_value(record.data.clone()).map_err(|e| StoreError::Corrupt {
        collection: collection.to_string(),
        reason: format!("record {}: {}", record.id, e),
    })
}

pub(crate) fn encode_payload<T: Serialize>(payload: &T) -> StoreResult<Value> {
    Ok(serde_json::to_value(payload)?)
}
