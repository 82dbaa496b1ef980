//! Hours worked from clock-in/clock-out times, and their display format.

use chrono::NaiveTime;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Longest break accepted on a time entry, in minutes
pub const MAX_BREAK_MINUTES: u32 = 480;

/// Parse a time of day written as `HH:MM`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Render a time of day the way it is stored and shown: `HH:MM`.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Hours worked between `start` and `end` minus the break.
///
/// An end earlier than the start is read as crossing midnight. The result is
/// never negative, and is zero when either time is missing.
pub fn calculate_hours(start: Option<NaiveTime>, end: Option<NaiveTime>, break_minutes: u32) -> f64 {
    let (Some(start), Some(end)) = (start, end) else {
        return 0.0;
    };

    let mut elapsed = end.signed_duration_since(start).num_minutes();
    if elapsed < 0 {
        elapsed += MINUTES_PER_DAY;
    }

    let worked = elapsed - i64::from(break_minutes);
    (worked as f64 / 60.0).max(0.0)
}

/// Format hours as `"{H}h {M}m"`.
///
/// Minutes are rounded on the total, so 1.9999 hours reads `2h 0m` rather
/// than `1h 60m`.
pub fn format_time(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "0h 0m".to_string();
    }
    let total_minutes = (hours * 60.0).round() as u64;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Round to two decimals for API payloads
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
