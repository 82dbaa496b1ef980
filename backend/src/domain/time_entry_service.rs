use chrono::NaiveDate;
use log::{info, warn};
use std::collections::HashMap;

use crate::domain::conflict::partition_dates;
use crate::domain::duration::{calculate_hours, parse_time_of_day};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::time_entry::{DomainTimeEntry, TimeEntryFields};
use crate::domain::models::vacation_request::RequestStatus;
use crate::domain::session::Session;
use crate::domain::user_locks::{acquire, UserLocks};
use crate::storage::{TimeEntryRepository, VacationRequestRepository};

/// One batch of days logged with the same hours
#[derive(Debug, Clone)]
pub struct TimeEntrySubmission {
    pub dates: Vec<NaiveDate>,
    pub start_time: String,
    pub end_time: String,
    pub break_minutes: u32,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    /// Sorted by date
    pub saved: Vec<DomainTimeEntry>,
    /// Dates that already had an entry, now overwritten
    pub replaced_dates: Vec<NaiveDate>,
    /// Dates inside approved vacation; nothing written for them
    pub skipped: Vec<NaiveDate>,
    pub hours_per_day: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoursPreview {
    pub hours_per_day: f64,
    pub total_hours: f64,
}

/// Service for logging and reading worked hours
#[derive(Clone)]
pub struct TimeEntryService {
    entries: TimeEntryRepository,
    vacations: VacationRequestRepository,
    locks: UserLocks,
    max_break_minutes: u32,
}

impl TimeEntryService {
    pub fn new(
        entries: TimeEntryRepository,
        vacations: VacationRequestRepository,
        locks: UserLocks,
        max_break_minutes: u32,
    ) -> Self {
        Self {
            entries,
            vacations,
            locks,
            max_break_minutes,
        }
    }

    /// Hours for one day with the given times and the total over `days`
    pub fn preview_hours(start_time: &str, end_time: &str, break_minutes: u32, days: u32) -> HoursPreview {
        let hours_per_day = calculate_hours(
            parse_time_of_day(start_time),
            parse_time_of_day(end_time),
            break_minutes,
        );
        HoursPreview {
            hours_per_day,
            total_hours: hours_per_day * f64::from(days),
        }
    }

    /// Log the same hours on each selected date for the caller.
    ///
    /// Dates inside approved vacation are skipped and reported. A date that
    /// already has an entry gets that entry overwritten.
    pub fn submit_entries(
        &self,
        session: &Session,
        submission: TimeEntrySubmission,
    ) -> DomainResult<SubmissionResult> {
        info!(
            "Submitting {} time entries for {}",
            submission.dates.len(),
            session.user_id
        );

        if submission.dates.is_empty() {
            return Err(DomainError::validation("Select at least one date"));
        }
        let (Some(start_time), Some(end_time)) = (
            parse_time_of_day(&submission.start_time),
            parse_time_of_day(&submission.end_time),
        ) else {
            return Err(DomainError::validation(
                "Start and end times are required in HH:MM format",
            ));
        };
        if submission.break_minutes > self.max_break_minutes {
            return Err(DomainError::validation(format!(
                "Break cannot exceed {} minutes",
                self.max_break_minutes
            )));
        }

        let user_id = session.user_id.as_str();
        let lock = self.locks.lock_for(user_id)?;
        let _guard = acquire(&lock)?;

        let approved: Vec<_> = self
            .vacations
            .list_requests(user_id)?
            .into_iter()
            .filter(|request| request.status == RequestStatus::Approved)
            .collect();
        let partition = partition_dates(&submission.dates, &approved);

        if partition.valid.is_empty() {
            warn!("All {} dates fall in approved vacation for {}", partition.skipped.len(), user_id);
            return Err(DomainError::AllDatesInVacation {
                skipped: partition.skipped,
            });
        }

        let existing_by_date: HashMap<NaiveDate, String> = self
            .entries
            .list_entries(user_id)?
            .into_iter()
            .map(|entry| (entry.date, entry.id))
            .collect();

        let notes = submission.notes.trim().to_string();
        let mut saved = Vec::with_capacity(partition.valid.len());
        let mut replaced_dates = Vec::new();

        for date in partition.valid {
            let fields = TimeEntryFields {
                date,
                start_time,
                end_time,
                break_minutes: submission.break_minutes,
                notes: notes.clone(),
            };

            let entry = match existing_by_date.get(&date) {
                Some(entry_id) => {
                    replaced_dates.push(date);
                    self.entries.update_entry(user_id, entry_id, &fields)?
                }
                None => self.entries.create_entry(user_id, &fields)?,
            };
            saved.push(entry);
        }

        let hours_per_day = calculate_hours(Some(start_time), Some(end_time), submission.break_minutes);
        info!(
            "Saved {} entries ({} replaced, {} skipped) for {}",
            saved.len(),
            replaced_dates.len(),
            partition.skipped.len(),
            user_id
        );

        Ok(SubmissionResult {
            saved,
            replaced_dates,
            skipped: partition.skipped,
            hours_per_day,
        })
    }

    /// Entries of `user_id` (the caller when `None`) within the optional
    /// bounds, sorted by date
    pub fn list_entries(
        &self,
        session: &Session,
        user_id: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DomainResult<Vec<DomainTimeEntry>> {
        let user_id = user_id.unwrap_or(&session.user_id);
        session.require_self_or_admin(user_id)?;

        let mut entries: Vec<DomainTimeEntry> = self
            .entries
            .list_entries(user_id)?
            .into_iter()
            .filter(|entry| from.map_or(true, |from| entry.date >= from))
            .filter(|entry| to.map_or(true, |to| entry.date <= to))
            .collect();
        entries.sort_by_key(|entry| entry.date);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::duration::format_time_of_day;
    use crate::domain::models::user::Role;
    use crate::domain::models::vacation_request::NewVacationRequest;
    use crate::storage::{InMemoryRecordStore, RecordStore};
    use chrono::Utc;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(user_id: &str, role: Role) -> Session {
        Session {
            user_id: user_id.to_string(),
            name: user_id.to_string(),
            email: format!("{}@demo.com", user_id),
            role,
        }
    }

    fn setup() -> (TimeEntryService, VacationRequestRepository) {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let vacations = VacationRequestRepository::new(store.clone());
        let service = TimeEntryService::new(
            TimeEntryRepository::new(store),
            vacations.clone(),
            UserLocks::new(),
            480,
        );
        (service, vacations)
    }

    fn submission(dates: Vec<NaiveDate>, start: &str, end: &str) -> TimeEntrySubmission {
        TimeEntrySubmission {
            dates,
            start_time: start.to_string(),
            end_time: end.to_string(),
            break_minutes: 60,
            notes: " cliente A ".to_string(),
        }
    }

    fn approve_vacation(vacations: &VacationRequestRepository, user_id: &str, start: NaiveDate, end: NaiveDate) {
        let request = vacations
            .create_request(
                user_id,
                &NewVacationRequest {
                    start_date: start,
                    end_date: end,
                    days_requested: 1,
                    reason: "x".to_string(),
                },
            )
            .unwrap();
        vacations
            .record_decision(user_id, &request.id, RequestStatus::Approved, "admin", Utc::now())
            .unwrap();
    }

    #[test]
    fn test_submit_saves_one_entry_per_date() {
        let (service, _) = setup();
        let employee = session("u1", Role::Employee);

        let result = service
            .submit_entries(&employee, submission(vec![date(2024, 1, 3), date(2024, 1, 2)], "09:00", "17:00"))
            .unwrap();

        assert_eq!(result.saved.len(), 2);
        assert_eq!(result.saved[0].date, date(2024, 1, 2));
        assert_eq!(result.saved[0].notes, "cliente A");
        assert_eq!(result.hours_per_day, 7.0);
        assert!(result.replaced_dates.is_empty());
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_resubmitting_a_date_replaces_the_entry() {
        let (service, _) = setup();
        let employee = session("u1", Role::Employee);
        service
            .submit_entries(&employee, submission(vec![date(2024, 1, 2)], "09:00", "17:00"))
            .unwrap();

        let result = service
            .submit_entries(&employee, submission(vec![date(2024, 1, 2), date(2024, 1, 3)], "08:00", "14:00"))
            .unwrap();
        assert_eq!(result.replaced_dates, vec![date(2024, 1, 2)]);

        let entries = service.list_entries(&employee, None, None, None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(format_time_of_day(entries[0].start_time), "08:00");
        assert_eq!(entries[0].hours(), 5.0);
    }

    #[test]
    fn test_dates_in_approved_vacation_are_skipped() {
        let (service, vacations) = setup();
        let employee = session("u1", Role::Employee);
        approve_vacation(&vacations, "u1", date(2024, 8, 5), date(2024, 8, 6));

        let result = service
            .submit_entries(
                &employee,
                submission(vec![date(2024, 8, 5), date(2024, 8, 6), date(2024, 8, 7)], "09:00", "17:00"),
            )
            .unwrap();

        assert_eq!(result.saved.len(), 1);
        assert_eq!(result.skipped, vec![date(2024, 8, 5), date(2024, 8, 6)]);
    }

    #[test]
    fn test_all_dates_in_vacation_writes_nothing() {
        let (service, vacations) = setup();
        let employee = session("u1", Role::Employee);
        approve_vacation(&vacations, "u1", date(2024, 8, 5), date(2024, 8, 9));

        let result = service.submit_entries(&employee, submission(vec![date(2024, 8, 6)], "09:00", "17:00"));
        assert!(matches!(result, Err(DomainError::AllDatesInVacation { .. })));
        assert!(service.list_entries(&employee, None, None, None).unwrap().is_empty());
    }

    #[test]
    fn test_submission_validation() {
        let (service, _) = setup();
        let employee = session("u1", Role::Employee);

        let missing_time = submission(vec![date(2024, 1, 2)], "", "17:00");
        assert!(matches!(
            service.submit_entries(&employee, missing_time),
            Err(DomainError::Validation(_))
        ));

        let mut long_break = submission(vec![date(2024, 1, 2)], "09:00", "17:00");
        long_break.break_minutes = 481;
        assert!(matches!(
            service.submit_entries(&employee, long_break),
            Err(DomainError::Validation(_))
        ));

        assert!(matches!(
            service.submit_entries(&employee, submission(vec![], "09:00", "17:00")),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_list_entries_filters_and_guards_access() {
        let (service, _) = setup();
        let employee = session("u1", Role::Employee);
        service
            .submit_entries(
                &employee,
                submission(vec![date(2024, 1, 2), date(2024, 2, 1), date(2024, 3, 1)], "09:00", "17:00"),
            )
            .unwrap();

        let february = service
            .list_entries(&employee, None, Some(date(2024, 2, 1)), Some(date(2024, 2, 29)))
            .unwrap();
        assert_eq!(february.len(), 1);

        let admin = session("boss", Role::Admin);
        assert_eq!(service.list_entries(&admin, Some("u1"), None, None).unwrap().len(), 3);
        assert!(matches!(
            service.list_entries(&session("u2", Role::Employee), Some("u1"), None, None),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn test_preview_hours() {
        let preview = TimeEntryService::preview_hours("09:00", "17:30", 30, 5);
        assert_eq!(preview.hours_per_day, 8.0);
        assert_eq!(preview.total_hours, 40.0);
        assert_eq!(TimeEntryService::preview_hours("", "17:30", 0, 5).total_hours, 0.0);
    }
}
