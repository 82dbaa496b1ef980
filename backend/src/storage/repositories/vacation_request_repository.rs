use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::{decode_payload, encode_payload};
use crate::domain::models::vacation_request::{
    DomainVacationRequest, NewVacationRequest, RequestStatus,
};
use crate::storage::error::StoreResult;
use crate::storage::traits::{Collection, RecordStore, StoredRecord};

/// Payload stored for a vacation request
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VacationRequestRecord {
    user_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    days_requested: u32,
    #[serde(default)]
    reason: String,
    status: RequestStatus,
    #[serde(default)]
    approved_by: Option<String>,
    #[serde(default)]
    approved_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct VacationRequestRepository {
    store: Arc<dyn RecordStore>,
}

impl VacationRequestRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn decode(collection: &Collection, record: StoredRecord) -> StoreResult<DomainVacationRequest> {
        let payload: VacationRequestRecord = decode_payload(collection, &record)?;
        Ok(DomainVacationRequest {
            id: record.id,
            user_id: payload.user_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            days_requested: payload.days_requested,
            reason: payload.reason,
            status: payload.status,
            approved_by: payload.approved_by,
            approved_at: payload.approved_at,
            created_at: record.created_at,
        })
    }

    /// Every request of one user, newest first
    pub fn list_requests(&self, user_id: &str) -> StoreResult<Vec<DomainVacationRequest>> {
        let collection = Collection::vacation_requests(user_id);
        let records = self.store.list(&collection, None, true)?;
        Ok(records
            .into_iter()
            .filter_map(|record| match Self::decode(&collection, record) {
                Ok(request) => Some(request),
                Err(e) => {
                    warn!("Ignoring unreadable vacation request: {}", e);
                    None
                }
            })
            .collect())
    }

    pub fn get_request(&self, user_id: &str, request_id: &str) -> StoreResult<Option<DomainVacationRequest>> {
        let collection = Collection::vacation_requests(user_id);
        self.store
            .get(&collection, request_id)?
            .map(|record| Self::decode(&collection, record))
            .transpose()
    }

    /// Store a new request in the pending state
    pub fn create_request(
        &self,
        user_id: &str,
        request: &NewVacationRequest,
    ) -> StoreResult<DomainVacationRequest> {
        let collection = Collection::vacation_requests(user_id);
        let payload = encode_payload(&VacationRequestRecord {
            user_id: user_id.to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
            days_requested: request.days_requested,
            reason: request.reason.clone(),
            status: RequestStatus::Pending,
            approved_by: None,
            approved_at: None,
        })?;

        let record = self.store.create(&collection, payload)?;
        info!(
            "Stored vacation request {} for {} ({} days)",
            record.id, user_id, request.days_requested
        );
        Self::decode(&collection, record)
    }

    /// Write the outcome of a decision. Only the decision fields change.
    pub fn record_decision(
        &self,
        user_id: &str,
        request_id: &str,
        status: RequestStatus,
        approved_by: &str,
        approved_at: DateTime<Utc>,
    ) -> StoreResult<DomainVacationRequest> {
        let collection = Collection::vacation_requests(user_id);
        let record = self.store.update(
            &collection,
            request_id,
            json!({
                "status": status,
                "approved_by": approved_by,
                "approved_at": approved_at,
            }),
        )?;
        Self::decode(&collection, record)
    }

    pub fn delete_request(&self, user_id: &str, request_id: &str) -> StoreResult<()> {
        self.store
            .delete(&Collection::vacation_requests(user_id), request_id)
    }
}
