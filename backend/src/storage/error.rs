//! Error type shared by every `RecordStore` implementation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {id} not found in collection {collection}")]
    NotFound { collection: String, id: String },

    #[error("record payload must be a JSON object")]
    InvalidPayload,

    #[error("malformed record in collection {collection}: {reason}")]
    Corrupt { collection: String, reason: String },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
