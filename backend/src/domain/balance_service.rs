//! Vacation balance rules.
//!
//! Pending and approved requests both reserve days. A request is charged to
//! the year its start date falls in, with the working-day count fixed at
//! submission.

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::domain::calendar::working_days_between;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::vacation_request::{DomainVacationRequest, RequestStatus};

/// Balance figures for one user and year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSummary {
    pub year: i32,
    pub allotted: u32,
    pub approved: u32,
    pub pending: u32,
    /// Negative when an administrator approved past the allotment
    pub remaining: i64,
}

impl BalanceSummary {
    pub fn compute(allotted: u32, requests: &[DomainVacationRequest], year: i32) -> Self {
        Self {
            year,
            allotted,
            approved: days_with_status(requests, year, RequestStatus::Approved),
            pending: days_with_status(requests, year, RequestStatus::Pending),
            remaining: remaining_days(allotted, requests, year),
        }
    }
}

fn days_with_status(requests: &[DomainVacationRequest], year: i32, status: RequestStatus) -> u32 {
    requests
        .iter()
        .filter(|request| request.status == status && request.start_date.year() == year)
        .map(|request| request.days_requested)
        .sum()
}

/// Days reserved by approved or pending requests starting in `year`
pub fn used_or_pending_days(requests: &[DomainVacationRequest], year: i32) -> u32 {
    requests
        .iter()
        .filter(|request| request.status.counts_against_balance() && request.start_date.year() == year)
        .map(|request| request.days_requested)
        .sum()
}

pub fn approved_days(requests: &[DomainVacationRequest], year: i32) -> u32 {
    days_with_status(requests, year, RequestStatus::Approved)
}

/// Allotment minus reserved days. Never clamped.
pub fn remaining_days(allotted: u32, requests: &[DomainVacationRequest], year: i32) -> i64 {
    i64::from(allotted) - i64::from(used_or_pending_days(requests, year))
}

/// Check that a new request for `start..=end` fits the balance of `year`.
///
/// Returns the working-day count to store on the request.
pub fn validate_request(
    allotted: u32,
    existing: &[DomainVacationRequest],
    start: NaiveDate,
    end: NaiveDate,
    year: i32,
) -> DomainResult<u32> {
    if end < start {
        return Err(DomainError::InvalidRange { start, end });
    }

    let requested = working_days_between(start, end);
    let available = remaining_days(allotted, existing, year);
    debug!(
        "Validating vacation {}..={}: {} days requested, {} available in {}",
        start, end, requested, available, year
    );

    if i64::from(requested) > available {
        return Err(DomainError::InsufficientBalance {
            requested,
            available,
        });
    }

    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(start: NaiveDate, days: u32, status: RequestStatus) -> DomainVacationRequest {
        DomainVacationRequest {
            id: format!("r{}", start),
            user_id: "u1".to_string(),
            start_date: start,
            end_date: start,
            days_requested: days,
            reason: "x".to_string(),
            status,
            approved_by: None,
            approved_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_used_days_counts_pending_and_approved_in_year() {
        let requests = vec![
            request(date(2024, 2, 5), 3, RequestStatus::Approved),
            request(date(2024, 3, 4), 2, RequestStatus::Pending),
            request(date(2024, 4, 1), 4, RequestStatus::Rejected),
            request(date(2023, 12, 27), 5, RequestStatus::Approved),
        ];

        assert_eq!(used_or_pending_days(&requests, 2024), 5);
        assert_eq!(used_or_pending_days(&requests, 2024), 5);
        assert_eq!(approved_days(&requests, 2024), 3);
        assert_eq!(remaining_days(22, &requests, 2024), 17);
    }

    #[test]
    fn test_request_spanning_new_year_is_charged_to_start_year() {
        let mut spanning = request(date(2024, 12, 30), 4, RequestStatus::Approved);
        spanning.end_date = date(2025, 1, 3);

        assert_eq!(used_or_pending_days(&[spanning.clone()], 2024), 4);
        assert_eq!(used_or_pending_days(&[spanning], 2025), 0);
    }

    #[test]
    fn test_remaining_can_go_negative() {
        let requests = vec![request(date(2024, 5, 6), 25, RequestStatus::Approved)];
        assert_eq!(remaining_days(22, &requests, 2024), -3);
    }

    #[test]
    fn test_validate_five_day_request_on_fresh_balance() {
        let days = validate_request(22, &[], date(2024, 1, 1), date(2024, 1, 7), 2024).unwrap();
        assert_eq!(days, 5);

        let saved = vec![request(date(2024, 1, 1), days, RequestStatus::Pending)];
        assert_eq!(remaining_days(22, &saved, 2024), 17);
    }

    #[test]
    fn test_validate_rejects_request_over_balance() {
        let existing = vec![request(date(2024, 3, 4), 19, RequestStatus::Approved)];
        let result = validate_request(22, &existing, date(2024, 6, 3), date(2024, 6, 6), 2024);

        assert!(matches!(
            result,
            Err(DomainError::InsufficientBalance { requested: 4, available: 3 })
        ));
    }

    #[test]
    fn test_validate_rejects_reversed_range() {
        let result = validate_request(22, &[], date(2024, 6, 6), date(2024, 6, 3), 2024);
        assert!(matches!(result, Err(DomainError::InvalidRange { .. })));
    }

    #[test]
    fn test_weekend_only_request_costs_nothing() {
        let days = validate_request(0, &[], date(2024, 1, 6), date(2024, 1, 7), 2024).unwrap();
        assert_eq!(days, 0);
    }

    #[test]
    fn test_summary_splits_approved_and_pending() {
        let requests = vec![
            request(date(2024, 2, 5), 3, RequestStatus::Approved),
            request(date(2024, 3, 4), 2, RequestStatus::Pending),
        ];
        let summary = BalanceSummary::compute(22, &requests, 2024);
        assert_eq!(
            summary,
            BalanceSummary {
                year: 2024,
                allotted: 22,
                approved: 3,
                pending: 2,
                remaining: 17
            }
        );
    }
}
