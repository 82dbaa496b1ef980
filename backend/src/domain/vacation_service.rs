//! # Vacation request lifecycle
//!
//! ```text
//!   submit ──► pending ──decide──► approved
//!                 │        └─────► rejected
//!                 └──cancel──► (deleted)
//! ```
//!
//! Submission validates against the balance before anything is stored.
//! A decision happens once, by an administrator; the working-day count
//! stored at submission is never recomputed. Submission, decision and
//! cancellation each hold the owner's write lock from the first read to the
//! last write.

use chrono::{Datelike, NaiveDate, Utc};
use log::{info, warn};

use crate::domain::balance_service::{validate_request, BalanceSummary};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::user::Role;
use crate::domain::models::vacation_request::{
    Decision, DomainVacationRequest, EmployeeVacationRequest, NewVacationRequest, RequestStatus,
};
use crate::domain::notification::{
    DecisionNotice, Notification, NotificationDispatcher, NotificationOutcome, RequestNotice,
};
use crate::domain::session::Session;
use crate::domain::user_locks::{acquire, UserLocks};
use crate::storage::{UserRepository, VacationRequestRepository};

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub request: DomainVacationRequest,
    /// Balance for the start date's year, including the new request
    pub balance: BalanceSummary,
    pub notification: NotificationOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub request: DomainVacationRequest,
    pub notification: NotificationOutcome,
}

#[derive(Clone)]
pub struct VacationService {
    users: UserRepository,
    requests: VacationRequestRepository,
    notifications: NotificationDispatcher,
    locks: UserLocks,
}

impl VacationService {
    pub fn new(
        users: UserRepository,
        requests: VacationRequestRepository,
        notifications: NotificationDispatcher,
        locks: UserLocks,
    ) -> Self {
        Self {
            users,
            requests,
            notifications,
            locks,
        }
    }

    /// Submit a request for the caller. Nothing is stored when validation
    /// fails.
    pub fn submit(
        &self,
        session: &Session,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: &str,
    ) -> DomainResult<SubmissionOutcome> {
        info!(
            "Submitting vacation request for {}: {}..={}",
            session.user_id, start_date, end_date
        );

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("A reason is required"));
        }

        let user = self
            .users
            .get_user(&session.user_id)?
            .ok_or_else(|| DomainError::not_found("User", &session.user_id))?;

        let lock = self.locks.lock_for(&user.id)?;
        let _guard = acquire(&lock)?;

        let year = start_date.year();
        let existing = self.requests.list_requests(&user.id)?;
        let days_requested = validate_request(
            user.vacation_days_allotted,
            &existing,
            start_date,
            end_date,
            year,
        )?;

        let request = self.requests.create_request(
            &user.id,
            &NewVacationRequest {
                start_date,
                end_date,
                days_requested,
                reason: reason.to_string(),
            },
        )?;

        let mut all_requests = existing;
        all_requests.push(request.clone());
        let balance = BalanceSummary::compute(user.vacation_days_allotted, &all_requests, year);

        let notification = self
            .notifications
            .dispatch(Notification::VacationRequested(RequestNotice {
                employee_name: user.name.clone(),
                employee_email: user.email.clone(),
                start_date,
                end_date,
                days: days_requested,
                reason: request.reason.clone(),
            }));

        info!(
            "Vacation request {} stored: {} days, {} remaining in {}",
            request.id, days_requested, balance.remaining, year
        );

        Ok(SubmissionOutcome {
            request,
            balance,
            notification,
        })
    }

    /// Approve or reject a pending request. Administrators only.
    pub fn decide(
        &self,
        session: &Session,
        owner_id: &str,
        request_id: &str,
        decision: Decision,
    ) -> DomainResult<DecisionOutcome> {
        session.require_admin()?;
        info!("Deciding vacation request {} of {}: {:?}", request_id, owner_id, decision);
        self.require_known_owner(owner_id)?;

        let lock = self.locks.lock_for(owner_id)?;
        let _guard = acquire(&lock)?;

        let request = self.get_request(owner_id, request_id)?;
        if request.status != RequestStatus::Pending {
            warn!("Request {} is already {}", request_id, request.status);
            return Err(DomainError::InvalidTransition {
                from: request.status,
            });
        }

        let status = decision.resulting_status();
        let decided = self.requests.record_decision(
            owner_id,
            request_id,
            status,
            &session.user_id,
            Utc::now(),
        )?;

        let notification = match self.users.get_user(owner_id)? {
            Some(owner) => self
                .notifications
                .dispatch(Notification::VacationDecided(DecisionNotice {
                    employee_email: owner.email,
                    employee_name: owner.name,
                    start_date: decided.start_date,
                    end_date: decided.end_date,
                    status,
                })),
            None => {
                warn!("Owner {} of request {} no longer exists", owner_id, request_id);
                NotificationOutcome::Skipped {
                    reason: "employee account not found".to_string(),
                }
            }
        };

        info!("Vacation request {} {} by {}", request_id, status, session.user_id);
        Ok(DecisionOutcome {
            request: decided,
            notification,
        })
    }

    /// Withdraw a pending request. Only its owner may do this.
    pub fn cancel(&self, session: &Session, owner_id: &str, request_id: &str) -> DomainResult<()> {
        info!("Cancelling vacation request {} of {}", request_id, owner_id);
        self.require_known_owner(owner_id)?;

        let lock = self.locks.lock_for(owner_id)?;
        let _guard = acquire(&lock)?;

        let request = self.get_request(owner_id, request_id)?;
        if request.user_id != session.user_id {
            return Err(DomainError::forbidden("Only the owner can cancel a request"));
        }
        if !request.is_pending() {
            return Err(DomainError::InvalidTransition {
                from: request.status,
            });
        }

        self.requests.delete_request(owner_id, request_id)?;
        info!("Vacation request {} cancelled", request_id);
        Ok(())
    }

    /// Locks are keyed by user id, so only ids of existing users may take one
    fn require_known_owner(&self, owner_id: &str) -> DomainResult<()> {
        match self.users.get_user(owner_id)? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("User", owner_id)),
        }
    }

    fn get_request(&self, owner_id: &str, request_id: &str) -> DomainResult<DomainVacationRequest> {
        self.requests
            .get_request(owner_id, request_id)?
            .ok_or_else(|| DomainError::not_found("Vacation request", request_id))
    }

    /// The caller's own requests, newest first
    pub fn list_own(&self, session: &Session) -> DomainResult<Vec<DomainVacationRequest>> {
        let mut requests = self.requests.list_requests(&session.user_id)?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    /// Requests of every employee with their names, newest first.
    /// Administrators only.
    pub fn list_all(&self, session: &Session) -> DomainResult<Vec<EmployeeVacationRequest>> {
        session.require_admin()?;

        let mut all = Vec::new();
        for user in self.users.list_users()? {
            if user.role != Role::Employee {
                continue;
            }
            for request in self.requests.list_requests(&user.id)? {
                all.push(EmployeeVacationRequest {
                    request,
                    employee_name: user.name.clone(),
                });
            }
        }

        all.sort_by(|a, b| b.request.created_at.cmp(&a.request.created_at));
        info!("Listed {} vacation requests across employees", all.len());
        Ok(all)
    }

    /// Pending requests across every employee
    pub fn count_pending(&self) -> DomainResult<u32> {
        let mut pending = 0;
        for user in self.users.list_users()? {
            pending += self
                .requests
                .list_requests(&user.id)?
                .iter()
                .filter(|request| request.is_pending())
                .count() as u32;
        }
        Ok(pending)
    }

    pub fn balance(&self, session: &Session, user_id: Option<&str>, year: i32) -> DomainResult<BalanceSummary> {
        let user_id = user_id.unwrap_or(&session.user_id);
        session.require_self_or_admin(user_id)?;

        let user = self
            .users
            .get_user(user_id)?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        let requests = self.requests.list_requests(user_id)?;
        Ok(BalanceSummary::compute(user.vacation_days_allotted, &requests, year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::user::NewUser;
    use crate::domain::notification::LoggingNotificationSink;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::{InMemoryRecordStore, RecordStore};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        service: VacationService,
        requests: VacationRequestRepository,
        admin: Session,
        employee: Session,
        other: Session,
    }

    fn fixture_with(notifications: NotificationDispatcher, allotted: u32) -> Fixture {
        fixture_on(Arc::new(InMemoryRecordStore::new()), notifications, allotted)
    }

    fn fixture_on(store: Arc<dyn RecordStore>, notifications: NotificationDispatcher, allotted: u32) -> Fixture {
        let users = UserRepository::new(store.clone());
        let requests = VacationRequestRepository::new(store);

        let create = |email: &str, role: Role| {
            let user = users
                .create_user(&NewUser {
                    email: email.to_string(),
                    password_hash: "x".to_string(),
                    name: email.split('@').next().unwrap_or_default().to_string(),
                    role,
                    department: "Ops".to_string(),
                    vacation_days_allotted: allotted,
                    hire_date: date(2023, 1, 1),
                })
                .unwrap();
            Session::for_user(&user)
        };
        let admin = create("admin@demo.com", Role::Admin);
        let employee = create("ana@demo.com", Role::Employee);
        let other = create("luis@demo.com", Role::Employee);

        Fixture {
            service: VacationService::new(users, requests.clone(), notifications, UserLocks::new()),
            requests,
            admin,
            employee,
            other,
        }
    }

    fn fixture(allotted: u32) -> Fixture {
        fixture_with(NotificationDispatcher::disabled(), allotted)
    }

    #[test]
    fn test_submit_five_days_on_fresh_balance() {
        let f = fixture(22);
        let outcome = f
            .service
            .submit(&f.employee, date(2024, 1, 1), date(2024, 1, 7), "Family trip")
            .unwrap();

        assert_eq!(outcome.request.days_requested, 5);
        assert_eq!(outcome.request.status, RequestStatus::Pending);
        assert_eq!(outcome.balance.remaining, 17);
        assert_eq!(outcome.balance.pending, 5);
        assert_eq!(outcome.notification, NotificationOutcome::Disabled);
    }

    #[test]
    fn test_insufficient_balance_stores_nothing() {
        let f = fixture(3);
        let result = f
            .service
            .submit(&f.employee, date(2024, 6, 3), date(2024, 6, 6), "Trip");

        assert!(matches!(
            result,
            Err(DomainError::InsufficientBalance { requested: 4, available: 3 })
        ));
        assert!(f.requests.list_requests(&f.employee.user_id).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_range_and_empty_reason() {
        let f = fixture(22);
        assert!(matches!(
            f.service.submit(&f.employee, date(2024, 6, 6), date(2024, 6, 3), "Trip"),
            Err(DomainError::InvalidRange { .. })
        ));
        assert!(matches!(
            f.service.submit(&f.employee, date(2024, 6, 3), date(2024, 6, 6), "   "),
            Err(DomainError::Validation(_))
        ));
        assert!(f.requests.list_requests(&f.employee.user_id).unwrap().is_empty());
    }

    #[test]
    fn test_decide_approves_once() {
        let f = fixture(22);
        let request = f
            .service
            .submit(&f.employee, date(2024, 3, 4), date(2024, 3, 8), "Trip")
            .unwrap()
            .request;

        let decided = f
            .service
            .decide(&f.admin, &f.employee.user_id, &request.id, Decision::Approve)
            .unwrap()
            .request;
        assert_eq!(decided.status, RequestStatus::Approved);
        assert_eq!(decided.approved_by.as_deref(), Some(f.admin.user_id.as_str()));
        let approved_at = decided.approved_at;
        assert!(approved_at.is_some());

        let again = f
            .service
            .decide(&f.admin, &f.employee.user_id, &request.id, Decision::Reject);
        assert!(matches!(
            again,
            Err(DomainError::InvalidTransition { from: RequestStatus::Approved })
        ));

        let stored = f
            .requests
            .get_request(&f.employee.user_id, &request.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
        assert_eq!(stored.approved_at, approved_at);
    }

    #[test]
    fn test_owner_id_must_match_an_existing_user() {
        let env = TestEnvironment::new().unwrap();
        let f = fixture_on(env.record_store(), NotificationDispatcher::disabled(), 22);
        let request = f
            .service
            .submit(&f.employee, date(2024, 3, 4), date(2024, 3, 8), "Trip")
            .unwrap()
            .request;

        // Resolves to the same file on disk but is not a user id
        let variant = f.employee.user_id.to_uppercase();
        assert!(f.requests.get_request(&variant, &request.id).unwrap().is_some());

        assert!(matches!(
            f.service.decide(&f.admin, &variant, &request.id, Decision::Approve),
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            f.service.cancel(&f.employee, &variant, &request.id),
            Err(DomainError::NotFound { .. })
        ));

        let stored = f.requests.get_request(&f.employee.user_id, &request.id).unwrap().unwrap();
        assert!(stored.is_pending());
    }

    #[test]
    fn test_decide_requires_admin() {
        let f = fixture(22);
        let request = f
            .service
            .submit(&f.employee, date(2024, 3, 4), date(2024, 3, 8), "Trip")
            .unwrap()
            .request;

        let result = f
            .service
            .decide(&f.employee, &f.employee.user_id, &request.id, Decision::Approve);
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[test]
    fn test_rejected_days_return_to_balance() {
        let f = fixture(22);
        let request = f
            .service
            .submit(&f.employee, date(2024, 3, 4), date(2024, 3, 8), "Trip")
            .unwrap()
            .request;
        f.service
            .decide(&f.admin, &f.employee.user_id, &request.id, Decision::Reject)
            .unwrap();

        let balance = f.service.balance(&f.employee, None, 2024).unwrap();
        assert_eq!(balance.remaining, 22);
    }

    #[test]
    fn test_cancel_by_non_owner_is_forbidden() {
        let f = fixture(22);
        let request = f
            .service
            .submit(&f.employee, date(2024, 3, 4), date(2024, 3, 8), "Trip")
            .unwrap()
            .request;

        let result = f.service.cancel(&f.other, &f.employee.user_id, &request.id);
        assert!(matches!(result, Err(DomainError::Forbidden(_))));

        let stored = f
            .requests
            .get_request(&f.employee.user_id, &request.id)
            .unwrap()
            .unwrap();
        assert!(stored.is_pending());
    }

    #[test]
    fn test_cancel_only_while_pending() {
        let f = fixture(22);
        let first = f
            .service
            .submit(&f.employee, date(2024, 3, 4), date(2024, 3, 8), "Trip")
            .unwrap()
            .request;
        let second = f
            .service
            .submit(&f.employee, date(2024, 4, 1), date(2024, 4, 2), "Dentist")
            .unwrap()
            .request;
        f.service
            .decide(&f.admin, &f.employee.user_id, &first.id, Decision::Approve)
            .unwrap();

        assert!(matches!(
            f.service.cancel(&f.employee, &f.employee.user_id, &first.id),
            Err(DomainError::InvalidTransition { .. })
        ));
        f.service
            .cancel(&f.employee, &f.employee.user_id, &second.id)
            .unwrap();
        assert!(matches!(
            f.service.cancel(&f.employee, &f.employee.user_id, &second.id),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn test_admin_listing_and_pending_count() {
        let f = fixture(22);
        f.service
            .submit(&f.employee, date(2024, 3, 4), date(2024, 3, 8), "Trip")
            .unwrap();
        f.service
            .submit(&f.other, date(2024, 5, 6), date(2024, 5, 7), "Move")
            .unwrap();

        let all = f.service.list_all(&f.admin).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|r| r.employee_name == "ana"));
        assert_eq!(f.service.count_pending().unwrap(), 2);
        assert!(matches!(f.service.list_all(&f.employee), Err(DomainError::Forbidden(_))));
        assert_eq!(f.service.list_own(&f.employee).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_submissions_cannot_overdraw() {
        let f = fixture(5);
        let service = Arc::new(f.service.clone());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                let session = f.employee.clone();
                std::thread::spawn(move || {
                    service.submit(&session, date(2024, 9, 2), date(2024, 9, 4), "Trip")
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|result| result.is_ok())
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(f.requests.list_requests(&f.employee.user_id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notifications_are_queued_and_delivered() {
        let dispatcher = NotificationDispatcher::start(
            Arc::new(LoggingNotificationSink),
            "admin@empresa.com".to_string(),
            10,
        );
        let f = fixture_with(dispatcher.clone(), 22);

        let outcome = f
            .service
            .submit(&f.employee, date(2024, 3, 4), date(2024, 3, 8), "Trip")
            .unwrap();
        assert_eq!(outcome.notification, NotificationOutcome::Queued);

        let decision = f
            .service
            .decide(&f.admin, &f.employee.user_id, &outcome.request.id, Decision::Approve)
            .unwrap();
        assert_eq!(decision.notification, NotificationOutcome::Queued);

        dispatcher.flush().await;
        let recipients: Vec<String> = dispatcher.deliveries().into_iter().map(|d| d.recipient).collect();
        assert_eq!(recipients, vec!["ana@demo.com", "admin@empresa.com"]);
    }
}
