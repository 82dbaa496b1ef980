use chrono::Datelike;
use shared::{
    AdminStats, CalendarDay, CalendarMonth, DeliveryRecord, EmployeeStats, ExportReportResponse,
    TimeReport, TimeReportRow,
};

use crate::domain::calendar::CalendarMonthView;
use crate::domain::duration::{format_time, format_time_of_day, round_hours};
use crate::domain::notification::Delivery;
use crate::domain::report_service::{ExportedReport, TimeReportData};
use crate::domain::stats_service::{AdminDashboard, EmployeeDashboard};
use crate::io::rest::mappers::VacationMapper;

/// Mapping for dashboards, reports, the calendar and the delivery log
pub struct ReportMapper;

impl ReportMapper {
    pub fn employee_stats_to_dto(stats: EmployeeDashboard) -> EmployeeStats {
        EmployeeStats {
            year: stats.year,
            worked_days: stats.worked_days,
            balance: VacationMapper::balance_to_dto(stats.balance),
            monthly_average_hours: round_hours(stats.monthly_average_hours),
            weekly_average_hours: round_hours(stats.weekly_average_hours),
            today_hours: round_hours(stats.today_hours),
            today_hours_formatted: format_time(stats.today_hours),
        }
    }

    pub fn admin_stats_to_dto(stats: AdminDashboard) -> AdminStats {
        AdminStats {
            year: stats.year,
            month: stats.month,
            total_employees: stats.total_employees,
            pending_vacations: stats.pending_vacations,
            total_hours_month: round_hours(stats.total_hours_month),
            average_hours_per_employee: round_hours(stats.average_hours_per_employee),
        }
    }

    pub fn time_report_to_dto(report: TimeReportData) -> TimeReport {
        let rows = report
            .entries
            .into_iter()
            .map(|entry| {
                let hours = entry.hours();
                TimeReportRow {
                    date: entry.date,
                    start_time: format_time_of_day(entry.start_time),
                    end_time: format_time_of_day(entry.end_time),
                    break_minutes: entry.break_minutes,
                    hours: round_hours(hours),
                    hours_formatted: format_time(hours),
                    notes: entry.notes,
                }
            })
            .collect();

        TimeReport {
            user_id: report.user_id,
            employee_name: report.employee_name,
            from: report.from,
            to: report.to,
            rows,
            total_hours: round_hours(report.total_hours),
            total_formatted: format_time(report.total_hours),
            average_hours_per_entry: round_hours(report.average_hours_per_entry),
            average_formatted: format_time(report.average_hours_per_entry),
        }
    }

    pub fn export_to_dto(export: ExportedReport) -> ExportReportResponse {
        ExportReportResponse {
            filename: export.filename,
            csv_content: export.csv_content,
            row_count: export.row_count,
        }
    }

    pub fn calendar_to_dto(view: CalendarMonthView) -> CalendarMonth {
        CalendarMonth {
            year: view.year,
            month: view.month,
            month_name: view.month_name.to_string(),
            days: view
                .days
                .into_iter()
                .map(|day| CalendarDay {
                    date: day.date,
                    day: day.date.day(),
                    in_month: day.in_month,
                    is_weekend: day.is_weekend,
                    is_today: day.is_today,
                    is_vacation: day.is_vacation,
                    hours_logged: day.hours_logged.map(round_hours),
                    hours_formatted: day.hours_logged.map(format_time),
                })
                .collect(),
        }
    }

    pub fn delivery_to_dto(delivery: Delivery) -> DeliveryRecord {
        DeliveryRecord {
            kind: delivery.kind.to_string(),
            recipient: delivery.recipient,
            success: delivery.success,
            message: delivery.message,
            delivered_at: delivery.delivered_at,
        }
    }
}
