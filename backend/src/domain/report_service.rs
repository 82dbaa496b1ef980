//! Time reports for one employee over a date range, and their CSV export.

use chrono::NaiveDate;
use csv::WriterBuilder;
use log::info;

use crate::domain::duration::{format_time, format_time_of_day};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::time_entry::DomainTimeEntry;
use crate::domain::session::Session;
use crate::storage::{TimeEntryRepository, UserRepository};

#[derive(Debug, Clone, PartialEq)]
pub struct TimeReportData {
    pub user_id: String,
    pub employee_name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Sorted by date
    pub entries: Vec<DomainTimeEntry>,
    pub total_hours: f64,
    pub average_hours_per_entry: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedReport {
    pub filename: String,
    pub csv_content: String,
    pub row_count: usize,
}

#[derive(Clone)]
pub struct ReportService {
    users: UserRepository,
    entries: TimeEntryRepository,
}

impl ReportService {
    pub fn new(users: UserRepository, entries: TimeEntryRepository) -> Self {
        Self { users, entries }
    }

    pub fn time_report(
        &self,
        session: &Session,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<TimeReportData> {
        session.require_self_or_admin(user_id)?;
        if to < from {
            return Err(DomainError::InvalidRange { start: from, end: to });
        }

        let user = self
            .users
            .get_user(user_id)?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        let mut entries: Vec<DomainTimeEntry> = self
            .entries
            .list_entries(user_id)?
            .into_iter()
            .filter(|entry| entry.date >= from && entry.date <= to)
            .collect();
        entries.sort_by_key(|entry| entry.date);

        let total_hours: f64 = entries.iter().map(DomainTimeEntry::hours).sum();
        let average_hours_per_entry = if entries.is_empty() {
            0.0
        } else {
            total_hours / entries.len() as f64
        };

        info!(
            "Report for {} {}..={}: {} entries, {:.2} hours",
            user.name,
            from,
            to,
            entries.len(),
            total_hours
        );

        Ok(TimeReportData {
            user_id: user.id,
            employee_name: user.name,
            from,
            to,
            entries,
            total_hours,
            average_hours_per_entry,
        })
    }

    /// The report as CSV text, one row per entry plus a total row
    pub fn export_csv(
        &self,
        session: &Session,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<ExportedReport> {
        let report = self.time_report(session, user_id, from, to)?;
        let csv_content = Self::render_csv(&report)?;

        let filename = format!(
            "report_{}_{}_{}.csv",
            Self::sanitize_name(&report.employee_name),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );

        info!(
            "✅ EXPORT: {} rows for {} ({} bytes) as {}",
            report.entries.len(),
            report.employee_name,
            csv_content.len(),
            filename
        );

        Ok(ExportedReport {
            filename,
            csv_content,
            row_count: report.entries.len(),
        })
    }

    fn render_csv(report: &TimeReportData) -> DomainResult<String> {
        let export_error = |e: String| DomainError::validation(format!("Could not render report: {}", e));

        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer
            .write_record(["date", "start_time", "end_time", "break_minutes", "hours", "notes"])
            .map_err(|e| export_error(e.to_string()))?;

        for entry in &report.entries {
            writer
                .write_record([
                    entry.date.format("%Y-%m-%d").to_string(),
                    format_time_of_day(entry.start_time),
                    format_time_of_day(entry.end_time),
                    entry.break_minutes.to_string(),
                    format_time(entry.hours()),
                    entry.notes.clone(),
                ])
                .map_err(|e| export_error(e.to_string()))?;
        }
        let total = format_time(report.total_hours);
        writer
            .write_record(["TOTAL", "", "", "", total.as_str(), ""])
            .map_err(|e| export_error(e.to_string()))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| export_error(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| export_error(e.to_string()))
    }

    fn sanitize_name(name: &str) -> String {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::duration::parse_time_of_day;
    use crate::domain::models::time_entry::TimeEntryFields;
    use crate::domain::models::user::{NewUser, Role};
    use crate::storage::{InMemoryRecordStore, RecordStore};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (ReportService, Session) {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let users = UserRepository::new(store.clone());
        let entries = TimeEntryRepository::new(store);
        let user = users
            .create_user(&NewUser {
                email: "ana@demo.com".to_string(),
                password_hash: "x".to_string(),
                name: "Ana María Ruiz".to_string(),
                role: Role::Employee,
                department: String::new(),
                vacation_days_allotted: 22,
                hire_date: date(2023, 1, 1),
            })
            .unwrap();

        for (day, end, notes) in [(2, "17:00", "plain"), (3, "13:30", "with, comma"), (20, "17:00", "out")] {
            entries
                .create_entry(
                    &user.id,
                    &TimeEntryFields {
                        date: date(2024, 1, day),
                        start_time: parse_time_of_day("09:00").unwrap(),
                        end_time: parse_time_of_day(end).unwrap(),
                        break_minutes: 0,
                        notes: notes.to_string(),
                    },
                )
                .unwrap();
        }

        (ReportService::new(users, entries), Session::for_user(&user))
    }

    #[test]
    fn test_report_totals_and_average() {
        let (service, session) = setup();
        let report = service
            .time_report(&session, &session.user_id, date(2024, 1, 1), date(2024, 1, 10))
            .unwrap();

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.total_hours, 12.5);
        assert_eq!(report.average_hours_per_entry, 6.25);
    }

    #[test]
    fn test_export_csv() {
        let (service, session) = setup();
        let export = service
            .export_csv(&session, &session.user_id, date(2024, 1, 1), date(2024, 1, 10))
            .unwrap();

        assert_eq!(export.filename, "report_ana_maría_ruiz_2024-01-01_2024-01-10.csv");
        assert_eq!(export.row_count, 2);

        let lines: Vec<&str> = export.csv_content.lines().collect();
        assert_eq!(lines[0], "date,start_time,end_time,break_minutes,hours,notes");
        assert_eq!(lines[1], "2024-01-02,09:00,17:00,0,8h 0m,plain");
        assert_eq!(lines[2], "2024-01-03,09:00,13:30,0,4h 30m,\"with, comma\"");
        assert_eq!(lines[3], "TOTAL,,,,12h 30m,");
    }

    #[test]
    fn test_report_access_and_range() {
        let (service, session) = setup();
        assert!(matches!(
            service.time_report(&session, "someone-else", date(2024, 1, 1), date(2024, 1, 10)),
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            service.time_report(&session, &session.user_id, date(2024, 1, 10), date(2024, 1, 1)),
            Err(DomainError::InvalidRange { .. })
        ));
    }
}
