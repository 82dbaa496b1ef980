//! # CSV Storage Module
//!
//! File-based implementation of the record store. Every collection maps to
//! one CSV file; per-user collections are grouped in a directory per user.
//!
//! ```text
//! data/
//! ├── user.csv
//! └── {user_id}/
//!     ├── time_entry.csv
//!     ├── vacation_request.csv
//!     └── document.csv
//! ```

pub mod connection;
pub mod record_store;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use record_store::CsvRecordStore;
