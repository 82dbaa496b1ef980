use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{decode_payload, encode_payload};
use crate::domain::models::document::{DocumentKind, DomainDocument, NewDocument};
use crate::storage::error::StoreResult;
use crate::storage::traits::{Collection, RecordStore, StoredRecord};

/// Payload stored for a document's metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentRecord {
    user_id: String,
    document_type: DocumentKind,
    file_name: String,
    #[serde(default)]
    file_url: String,
    #[serde(default)]
    month_year: Option<String>,
    #[serde(default)]
    folder: Option<String>,
    upload_date: DateTime<Utc>,
    uploaded_by: String,
}

#[derive(Clone)]
pub struct DocumentRepository {
    store: Arc<dyn RecordStore>,
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn decode(collection: &Collection, record: StoredRecord) -> StoreResult<DomainDocument> {
        let payload: DocumentRecord = decode_payload(collection, &record)?;
        Ok(DomainDocument {
            id: record.id,
            user_id: payload.user_id,
            kind: payload.document_type,
            file_name: payload.file_name,
            file_url: payload.file_url,
            month_year: payload.month_year,
            folder: payload.folder,
            upload_date: payload.upload_date,
            uploaded_by: payload.uploaded_by,
        })
    }

    /// Every document of one user, folder markers included, newest first
    pub fn list_documents(&self, user_id: &str) -> StoreResult<Vec<DomainDocument>> {
        let collection = Collection::documents(user_id);
        let records = self.store.list(&collection, None, true)?;
        Ok(records
            .into_iter()
            .filter_map(|record| match Self::decode(&collection, record) {
                Ok(document) => Some(document),
                Err(e) => {
                    warn!("Ignoring unreadable document: {}", e);
                    None
                }
            })
            .collect())
    }

    pub fn get_document(&self, user_id: &str, document_id: &str) -> StoreResult<Option<DomainDocument>> {
        let collection = Collection::documents(user_id);
        self.store
            .get(&collection, document_id)?
            .map(|record| Self::decode(&collection, record))
            .transpose()
    }

    pub fn create_document(&self, user_id: &str, document: &NewDocument) -> StoreResult<DomainDocument> {
        let collection = Collection::documents(user_id);
        let payload = encode_payload(&DocumentRecord {
            user_id: user_id.to_string(),
            document_type: document.kind,
            file_name: document.file_name.clone(),
            file_url: document.file_url.clone(),
            month_year: document.month_year.clone(),
            folder: document.folder.clone(),
            upload_date: Utc::now(),
            uploaded_by: document.uploaded_by.clone(),
        })?;

        let record = self.store.create(&collection, payload)?;
        info!("Stored document {} ({}) for {}", record.id, document.file_name, user_id);
        Self::decode(&collection, record)
    }

    pub fn delete_document(&self, user_id: &str, document_id: &str) -> StoreResult<()> {
        self.store.delete(&Collection::documents(user_id), document_id)
    }
}
