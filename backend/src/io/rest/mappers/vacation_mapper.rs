use shared::{NotificationStatus, VacationBalance, VacationDecision, VacationRequest, VacationStatus};

use crate::domain::balance_service::BalanceSummary;
use crate::domain::models::vacation_request::{
    Decision, DomainVacationRequest, EmployeeVacationRequest, RequestStatus,
};
use crate::domain::notification::NotificationOutcome;

pub struct VacationMapper;

impl VacationMapper {
    pub fn status_to_dto(status: RequestStatus) -> VacationStatus {
        match status {
            RequestStatus::Pending => VacationStatus::Pending,
            RequestStatus::Approved => VacationStatus::Approved,
            RequestStatus::Rejected => VacationStatus::Rejected,
        }
    }

    pub fn decision_to_domain(decision: VacationDecision) -> Decision {
        match decision {
            VacationDecision::Approved => Decision::Approve,
            VacationDecision::Rejected => Decision::Reject,
        }
    }

    pub fn to_dto(request: DomainVacationRequest, employee_name: Option<String>) -> VacationRequest {
        VacationRequest {
            id: request.id,
            user_id: request.user_id,
            employee_name,
            start_date: request.start_date,
            end_date: request.end_date,
            days_requested: request.days_requested,
            reason: request.reason,
            status: Self::status_to_dto(request.status),
            approved_by: request.approved_by,
            approved_at: request.approved_at,
            created_at: request.created_at,
        }
    }

    pub fn to_dto_list(requests: Vec<DomainVacationRequest>) -> Vec<VacationRequest> {
        requests
            .into_iter()
            .map(|request| Self::to_dto(request, None))
            .collect()
    }

    pub fn employee_requests_to_dto(requests: Vec<EmployeeVacationRequest>) -> Vec<VacationRequest> {
        requests
            .into_iter()
            .map(|item| Self::to_dto(item.request, Some(item.employee_name)))
            .collect()
    }

    pub fn balance_to_dto(balance: BalanceSummary) -> VacationBalance {
        VacationBalance {
            year: balance.year,
            allotted: balance.allotted,
            approved: balance.approved,
            pending: balance.pending,
            remaining: balance.remaining,
        }
    }

    pub fn notification_to_dto(outcome: NotificationOutcome) -> NotificationStatus {
        match outcome {
            NotificationOutcome::Queued => NotificationStatus::Queued,
            NotificationOutcome::Disabled => NotificationStatus::Disabled,
            NotificationOutcome::Skipped { reason } => NotificationStatus::Skipped { reason },
            NotificationOutcome::Failed { message } => NotificationStatus::Failed { message },
        }
    }
}
