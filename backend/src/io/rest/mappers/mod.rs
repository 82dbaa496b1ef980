//! Translation between domain models and the DTOs of the `shared` crate.

pub mod document_mapper;
pub mod report_mapper;
pub mod time_entry_mapper;
pub mod user_mapper;
pub mod vacation_mapper;

pub use document_mapper::DocumentMapper;
pub use report_mapper::ReportMapper;
pub use time_entry_mapper::TimeEntryMapper;
pub use user_mapper::UserMapper;
pub use vacation_mapper::VacationMapper;
