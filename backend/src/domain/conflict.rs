//! Checks of working days against approved vacation.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::domain::models::vacation_request::{DomainVacationRequest, RequestStatus};

/// True when `date` falls inside any approved request, bounds included.
/// Pending and rejected requests never block a date.
pub fn is_date_in_approved_vacation(date: NaiveDate, requests: &[DomainVacationRequest]) -> bool {
    requests
        .iter()
        .any(|request| request.status == RequestStatus::Approved && request.contains(date))
}

/// Candidate dates split into those that can take a time entry and those
/// that fall in approved vacation. Both lists are sorted and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatePartition {
    pub valid: Vec<NaiveDate>,
    pub skipped: Vec<NaiveDate>,
}

pub fn partition_dates(dates: &[NaiveDate], requests: &[DomainVacationRequest]) -> DatePartition {
    let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();

    let (skipped, valid) = unique
        .into_iter()
        .partition(|date| is_date_in_approved_vacation(*date, requests));

    DatePartition { valid, skipped }
}
