use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user account, as exposed over the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Employee,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Employee => write!(f, "employee"),
        }
    }
}

/// Public view of a user. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub department: String,
    /// Annual vacation grant in working days
    pub vacation_days_allotted: u32,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    /// Value to send back in the `X-User-Id` header
    pub session_user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    /// Defaults to the configured allotment when omitted
    pub vacation_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeListResponse {
    pub employees: Vec<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteEmployeeResponse {
    pub success_message: String,
}

/// A single day of logged work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    /// Time of day as `HH:MM`
    pub start_time: String,
    /// Time of day as `HH:MM`
    pub end_time: String,
    pub break_minutes: u32,
    pub notes: String,
    pub hours: f64,
    pub hours_formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitTimeEntriesRequest {
    pub dates: Vec<NaiveDate>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub break_minutes: u32,
    #[serde(default)]
    pub notes: String,
}

/// A date left out of a batch submission and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitTimeEntriesResponse {
    pub saved: Vec<TimeEntry>,
    /// Dates whose existing entry was overwritten
    pub replaced_dates: Vec<NaiveDate>,
    pub skipped: Vec<SkippedDate>,
    pub hours_per_day: f64,
    pub hours_per_day_formatted: String,
    pub total_hours_formatted: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeEntryListQuery {
    /// Only honoured for administrators
    pub user_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntryListResponse {
    pub entries: Vec<TimeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoursPreviewQuery {
    pub start_time: String,
    pub end_time: String,
    pub break_minutes: Option<u32>,
    /// Number of selected days, for the total line
    pub days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoursPreviewResponse {
    pub hours_per_day: f64,
    pub hours_per_day_formatted: String,
    pub total_formatted: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VacationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationRequest {
    pub id: String,
    pub user_id: String,
    /// Filled in on administrator listings
    pub employee_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: u32,
    pub reason: String,
    pub status: VacationStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitVacationRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

/// Outcome of handing a notification to the delivery queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum NotificationStatus {
    Queued,
    Disabled,
    Skipped { reason: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationBalance {
    pub year: i32,
    pub allotted: u32,
    pub approved: u32,
    pub pending: u32,
    /// Can be negative after an administrative override
    pub remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitVacationResponse {
    pub request: VacationRequest,
    pub balance: VacationBalance,
    pub notification: NotificationStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VacationDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecideVacationRequest {
    pub decision: VacationDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecideVacationResponse {
    pub request: VacationRequest,
    pub notification: NotificationStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelVacationResponse {
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationListResponse {
    pub requests: Vec<VacationRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Payroll,
    Contract,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub user_id: String,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_url: String,
    /// Pay period in `YYYY-MM` form, mostly for payroll slips
    pub month_year: Option<String>,
    pub folder: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub uploaded_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadDocumentRequest {
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_url: String,
    pub month_year: Option<String>,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentListQuery {
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<Document>,
    pub folders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderListResponse {
    pub folders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteDocumentResponse {
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeStats {
    pub year: i32,
    pub worked_days: u32,
    pub balance: VacationBalance,
    pub monthly_average_hours: f64,
    pub weekly_average_hours: f64,
    pub today_hours: f64,
    pub today_hours_formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub year: i32,
    pub month: u32,
    pub total_employees: u32,
    pub pending_vacations: u32,
    pub total_hours_month: f64,
    pub average_hours_per_employee: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeReportQuery {
    pub user_id: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeReportRow {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub break_minutes: u32,
    pub hours: f64,
    pub hours_formatted: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeReport {
    pub user_id: String,
    pub employee_name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<TimeReportRow>,
    pub total_hours: f64,
    pub total_formatted: String,
    pub average_hours_per_entry: f64,
    pub average_formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReportResponse {
    pub filename: String,
    pub csv_content: String,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonthQuery {
    pub year: i32,
    pub month: u32,
    /// Only honoured for administrators
    pub user_id: Option<String>,
}

/// One cell of the six-week month grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub in_month: bool,
    pub is_weekend: bool,
    pub is_today: bool,
    pub is_vacation: bool,
    pub hours_logged: Option<f64>,
    pub hours_formatted: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub kind: String,
    pub recipient: String,
    pub success: bool,
    pub message: String,
    pub delivered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLogResponse {
    pub deliveries: Vec<DeliveryRecord>,
}

/// Body returned with every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
