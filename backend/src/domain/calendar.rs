//! Working-day arithmetic and the month calendar view.
//!
//! The month view is a six-week grid starting on the Monday on or before
//! the first of the month. Each cell carries the hours logged that day and
//! whether it falls in approved vacation.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::info;
use std::collections::HashMap;

use crate::domain::conflict::is_date_in_approved_vacation;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::session::Session;
use crate::storage::{TimeEntryRepository, VacationRequestRepository};

const GRID_DAYS: i64 = 42;

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count Monday to Friday dates in `start..=end`. Zero for a reversed range.
pub fn working_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| !is_weekend(*date))
        .count() as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDayView {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_weekend: bool,
    pub is_today: bool,
    pub is_vacation: bool,
    pub hours_logged: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMonthView {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub days: Vec<CalendarDayView>,
}

#[derive(Clone)]
pub struct CalendarService {
    time_entries: TimeEntryRepository,
    vacations: VacationRequestRepository,
}

impl CalendarService {
    pub fn new(time_entries: TimeEntryRepository, vacations: VacationRequestRepository) -> Self {
        Self {
            time_entries,
            vacations,
        }
    }

    /// Build the month grid for `user_id` (the caller when `None`)
    pub fn month_view(
        &self,
        session: &Session,
        user_id: Option<&str>,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> DomainResult<CalendarMonthView> {
        let user_id = user_id.unwrap_or(&session.user_id);
        session.require_self_or_admin(user_id)?;
        info!("Building calendar {}-{:02} for {}", year, month, user_id);

        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DomainError::validation(format!("Invalid month {}-{}", year, month)))?;

        let mut hours_by_date: HashMap<NaiveDate, f64> = HashMap::new();
        for entry in self.time_entries.list_entries(user_id)? {
            *hours_by_date.entry(entry.date).or_default() += entry.hours();
        }
        let requests = self.vacations.list_requests(user_id)?;

        let out_of_range =
            || DomainError::validation(format!("Month {}-{:02} is outside the supported calendar", year, month));
        let grid_start = first
            .checked_sub_signed(Duration::days(i64::from(first.weekday().num_days_from_monday())))
            .ok_or_else(out_of_range)?;
        let days = (0..GRID_DAYS)
            .map(|offset| {
                let date = grid_start
                    .checked_add_signed(Duration::days(offset))
                    .ok_or_else(out_of_range)?;
                Ok(CalendarDayView {
                    date,
                    in_month: date.month() == month,
                    is_weekend: is_weekend(date),
                    is_today: date == today,
                    is_vacation: is_date_in_approved_vacation(date, &requests),
                    hours_logged: hours_by_date.get(&date).copied(),
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(CalendarMonthView {
            year,
            month,
            month_name: Self::month_name(month),
            days,
        })
    }

    pub fn days_in_month(month: u32, year: i32) -> u32 {
        match month {
            2 => {
                if Self::is_leap_year(year) {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    pub fn is_leap_year(year: i32) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    pub fn month_name(month: u32) -> &'static str {
        match month {
            1 => "January",
            2 => "February",
            3 => "March",
            4 => "April",
            5 => "May",
            6 => "June",
            7 => "July",
            8 => "August",
            9 => "September",
            10 => "October",
            11 => "November",
            12 => "December",
            _ => "Invalid",
        }
    }
}
