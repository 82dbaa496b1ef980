use chrono::{Datelike, NaiveDate};
use log::info;

use crate::domain::balance_service::BalanceSummary;
use crate::domain::calendar::CalendarService;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::user::Role;
use crate::domain::session::Session;
use crate::storage::{TimeEntryRepository, UserRepository, VacationRequestRepository};

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeDashboard {
    pub year: i32,
    /// Days with a time entry in the year
    pub worked_days: u32,
    pub balance: BalanceSummary,
    pub monthly_average_hours: f64,
    pub weekly_average_hours: f64,
    pub today_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminDashboard {
    pub year: i32,
    pub month: u32,
    pub total_employees: u32,
    pub pending_vacations: u32,
    pub total_hours_month: f64,
    pub average_hours_per_employee: f64,
}

/// Dashboard figures for employees and administrators
#[derive(Clone)]
pub struct StatsService {
    users: UserRepository,
    entries: TimeEntryRepository,
    vacations: VacationRequestRepository,
}

impl StatsService {
    pub fn new(users: UserRepository, entries: TimeEntryRepository, vacations: VacationRequestRepository) -> Self {
        Self {
            users,
            entries,
            vacations,
        }
    }

    pub fn employee_dashboard(&self, session: &Session, year: i32, today: NaiveDate) -> DomainResult<EmployeeDashboard> {
        info!("Computing dashboard for {} in {}", session.user_id, year);

        let user = self
            .users
            .get_user(&session.user_id)?
            .ok_or_else(|| DomainError::not_found("User", &session.user_id))?;
        let entries = self.entries.list_entries(&user.id)?;
        let requests = self.vacations.list_requests(&user.id)?;

        let in_year: Vec<_> = entries.iter().filter(|entry| entry.date.year() == year).collect();
        let year_hours: f64 = in_year.iter().map(|entry| entry.hours()).sum();
        let today_hours = entries
            .iter()
            .filter(|entry| entry.date == today)
            .map(|entry| entry.hours())
            .sum();

        Ok(EmployeeDashboard {
            year,
            worked_days: in_year.len() as u32,
            balance: BalanceSummary::compute(user.vacation_days_allotted, &requests, year),
            monthly_average_hours: year_hours / 12.0,
            weekly_average_hours: year_hours / 52.0,
            today_hours,
        })
    }

    /// Company-wide figures for one month. Administrators only.
    pub fn admin_dashboard(&self, session: &Session, year: i32, month: u32) -> DomainResult<AdminDashboard> {
        session.require_admin()?;
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!("Invalid month {}", month)));
        }
        info!("Computing admin dashboard for {}-{:02}", year, month);

        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DomainError::validation(format!("Invalid month {}-{}", year, month)))?;
        let last = first
            .with_day(CalendarService::days_in_month(month, year))
            .unwrap_or(first);

        let mut total_employees = 0u32;
        let mut pending_vacations = 0u32;
        let mut total_hours_month = 0.0;

        for user in self.users.list_users()? {
            if user.role == Role::Employee {
                total_employees += 1;
            }
            pending_vacations += self
                .vacations
                .list_requests(&user.id)?
                .iter()
                .filter(|request| request.is_pending())
                .count() as u32;
            total_hours_month += self
                .entries
                .list_entries(&user.id)?
                .iter()
                .filter(|entry| entry.date >= first && entry.date <= last)
                .map(|entry| entry.hours())
                .sum::<f64>();
        }

        let average_hours_per_employee = if total_employees == 0 {
            0.0
        } else {
            total_hours_month / f64::from(total_employees)
        };

        Ok(AdminDashboard {
            year,
            month,
            total_employees,
            pending_vacations,
            total_hours_month,
            average_hours_per_employee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::duration::parse_time_of_day;
    use crate::domain::models::time_entry::TimeEntryFields;
    use crate::domain::models::user::NewUser;
    use crate::domain::models::vacation_request::{NewVacationRequest, RequestStatus};
    use crate::storage::{InMemoryRecordStore, RecordStore};
    use chrono::Utc;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        service: StatsService,
        entries: TimeEntryRepository,
        vacations: VacationRequestRepository,
        admin: Session,
        employee: Session,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let users = UserRepository::new(store.clone());
        let entries = TimeEntryRepository::new(store.clone());
        let vacations = VacationRequestRepository::new(store);
        let make = |email: &str, role: Role| {
            Session::for_user(
                &users
                    .create_user(&NewUser {
                        email: email.to_string(),
                        password_hash: "x".to_string(),
                        name: email.to_string(),
                        role,
                        department: String::new(),
                        vacation_days_allotted: 22,
                        hire_date: date(2023, 1, 1),
                    })
                    .unwrap(),
            )
        };
        let admin = make("admin@demo.com", Role::Admin);
        let employee = make("ana@demo.com", Role::Employee);

        Fixture {
            service: StatsService::new(users, entries.clone(), vacations.clone()),
            entries,
            vacations,
            admin,
            employee,
        }
    }

    fn log_day(entries: &TimeEntryRepository, user_id: &str, day: NaiveDate, end: &str) {
        entries
            .create_entry(
                user_id,
                &TimeEntryFields {
                    date: day,
                    start_time: parse_time_of_day("09:00").unwrap(),
                    end_time: parse_time_of_day(end).unwrap(),
                    break_minutes: 0,
                    notes: String::new(),
                },
            )
            .unwrap();
    }

    fn request(vacations: &VacationRequestRepository, user_id: &str, days: u32) -> String {
        vacations
            .create_request(
                user_id,
                &NewVacationRequest {
                    start_date: date(2024, 4, 1),
                    end_date: date(2024, 4, 5),
                    days_requested: days,
                    reason: "x".to_string(),
                },
            )
            .unwrap()
            .id
    }

    #[test]
    fn test_employee_dashboard() {
        let f = fixture();
        let uid = f.employee.user_id.clone();
        log_day(&f.entries, &uid, date(2024, 3, 4), "21:00");
        log_day(&f.entries, &uid, date(2024, 3, 5), "21:00");
        log_day(&f.entries, &uid, date(2023, 3, 5), "21:00");
        let approved = request(&f.vacations, &uid, 3);
        f.vacations
            .record_decision(&uid, &approved, RequestStatus::Approved, "admin", Utc::now())
            .unwrap();
        request(&f.vacations, &uid, 2);

        let stats = f
            .service
            .employee_dashboard(&f.employee, 2024, date(2024, 3, 5))
            .unwrap();

        assert_eq!(stats.worked_days, 2);
        assert_eq!(stats.monthly_average_hours, 2.0);
        assert_eq!(stats.today_hours, 12.0);
        assert_eq!(stats.balance.approved, 3);
        assert_eq!(stats.balance.pending, 2);
        assert_eq!(stats.balance.remaining, 17);
    }

    #[test]
    fn test_admin_dashboard_counts_every_employee() {
        let f = fixture();
        let uid = f.employee.user_id.clone();
        log_day(&f.entries, &uid, date(2024, 3, 4), "17:00");
        log_day(&f.entries, &uid, date(2024, 3, 31), "13:00");
        log_day(&f.entries, &uid, date(2024, 4, 1), "17:00");
        request(&f.vacations, &uid, 2);

        let stats = f.service.admin_dashboard(&f.admin, 2024, 3).unwrap();
        assert_eq!(stats.total_employees, 1);
        assert_eq!(stats.pending_vacations, 1);
        assert_eq!(stats.total_hours_month, 12.0);
        assert_eq!(stats.average_hours_per_employee, 12.0);

        assert!(matches!(
            f.service.admin_dashboard(&f.employee, 2024, 3),
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.admin_dashboard(&f.admin, 2024, 0),
            Err(DomainError::Validation(_))
        ));
    }
}
