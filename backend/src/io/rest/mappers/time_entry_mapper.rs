use shared::TimeEntry;

use crate::domain::duration::{format_time, format_time_of_day, round_hours};
use crate::domain::models::time_entry::DomainTimeEntry;

pub struct TimeEntryMapper;

impl TimeEntryMapper {
    pub fn to_dto(entry: DomainTimeEntry) -> TimeEntry {
        let hours = entry.hours();
        TimeEntry {
            id: entry.id,
            user_id: entry.user_id,
            date: entry.date,
            start_time: format_time_of_day(entry.start_time),
            end_time: format_time_of_day(entry.end_time),
            break_minutes: entry.break_minutes,
            notes: entry.notes,
            hours: round_hours(hours),
            hours_formatted: format_time(hours),
        }
    }

    pub fn to_dto_list(entries: Vec<DomainTimeEntry>) -> Vec<TimeEntry> {
        entries.into_iter().map(Self::to_dto).collect()
    }
}
