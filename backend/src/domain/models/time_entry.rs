use chrono::{NaiveDate, NaiveTime};

use crate::domain::duration;

#[derive(Debug, Clone, PartialEq)]
pub struct DomainTimeEntry {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: u32,
    pub notes: String,
}

impl DomainTimeEntry {
    /// Hours worked on this entry, after the break
    pub fn hours(&self) -> f64 {
        duration::calculate_hours(Some(self.start_time), Some(self.end_time), self.break_minutes)
    }
}

/// Fields written for one day of a batch submission
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntryFields {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: u32,
    pub notes: String,
}
