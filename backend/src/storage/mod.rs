//! # Storage Module
//!
//! Handles all data persistence for the time tracking backend.
//!
//! Persistence is modelled as a collection-keyed object store: every record
//! lives in a named collection (`user`, `time_entry:<userId>`,
//! `vacation_request:<userId>`, `document:<userId>`) and carries a
//! server-assigned id and creation timestamp. The domain never relies on the
//! store to filter; it lists a collection and filters in memory.
//!
//! ## Implementations
//!
//! - **memory**: key-ordered in-memory store, used for tests and demo mode
//! - **csv**: one CSV file per collection under a data directory
//!
//! ## Layout
//!
//! - `traits`: the `RecordStore` contract and the `Collection` key type
//! - `repositories`: typed access to users, time entries, vacation requests
//!   and documents on top of any `RecordStore`

pub mod csv;
pub mod error;
pub mod memory;
pub mod repositories;
pub mod traits;

pub use self::csv::{CsvConnection, CsvRecordStore};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRecordStore;
pub use repositories::{
    DocumentRepository, TimeEntryRepository, UserRepository, VacationRequestRepository,
};
pub use traits::{Collection, RecordStore, StoredRecord};
