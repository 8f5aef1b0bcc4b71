//! Time Formatting
//!
//! Converts backend UTC timestamps into relative ("5m ago") and absolute
//! display strings. Backend timestamps without a zone designator are UTC.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Placeholder shown for missing or unparsable timestamps
pub const UNKNOWN: &str = "Unknown";

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Parse a backend timestamp as UTC.
///
/// Accepts RFC 3339 (`Z` or a numeric offset), naive ISO date-times with a
/// `T` or space separator, and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_utc(timestamp: &str) -> Option<DateTime<Utc>> {
    let timestamp = timestamp.trim();
    if timestamp.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Relative age of a timestamp: "Xm ago", "Xh ago" or "Xd ago".
///
/// Uses floor division, so anything under a minute reads "0m ago".
pub fn time_ago(timestamp: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(target) = timestamp.and_then(parse_utc) else {
        return UNKNOWN.to_string();
    };

    let diff_ms = (now - target).num_milliseconds();
    let mins = diff_ms.div_euclid(MS_PER_MINUTE);
    let hours = diff_ms.div_euclid(MS_PER_HOUR);
    let days = diff_ms.div_euclid(MS_PER_DAY);

    if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", days)
    }
}

/// Like [`time_ago`] but reports "Just now" for anything under a minute.
/// Used by the session and people lists.
pub fn time_ago_or_just_now(timestamp: Option<&str>, now: DateTime<Utc>) -> String {
    match timestamp.and_then(parse_utc) {
        Some(target) if (now - target).num_milliseconds() < MS_PER_MINUTE => {
            "Just now".to_string()
        }
        Some(_) => time_ago(timestamp, now),
        None => UNKNOWN.to_string(),
    }
}

/// Format a timestamp as a local date and time
pub fn format_timestamp(timestamp: Option<&str>) -> String {
    format_timestamp_in(timestamp, &Local)
}

/// Format a timestamp as a local date
pub fn format_date(timestamp: Option<&str>) -> String {
    format_date_in(timestamp, &Local)
}

/// Format a timestamp in the given zone as `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp_in<Tz: TimeZone>(timestamp: Option<&str>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .and_then(parse_utc)
        .map(|dt| dt.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Format a timestamp in the given zone as `YYYY-MM-DD`
pub fn format_date_in<Tz: TimeZone>(timestamp: Option<&str>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .and_then(parse_utc)
        .map(|dt| dt.with_timezone(tz).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Coarse duration between two timestamps: "Xm", "Xh" or "Xd"
pub fn calculate_duration(start: Option<&str>, end: Option<&str>) -> String {
    let (Some(start), Some(end)) = (start.and_then(parse_utc), end.and_then(parse_utc)) else {
        return UNKNOWN.to_string();
    };

    let diff_ms = (end - start).num_milliseconds();
    let mins = diff_ms.div_euclid(MS_PER_MINUTE);
    let hours = diff_ms.div_euclid(MS_PER_HOUR);

    if mins < 60 {
        format!("{}m", mins)
    } else if hours < 24 {
        format!("{}h", hours)
    } else {
        format!("{}d", diff_ms.div_euclid(MS_PER_DAY))
    }
}

/// Whole days between two timestamps, rounded up
pub fn days_between(start: Option<&str>, end: Option<&str>) -> i64 {
    match (start.and_then(parse_utc), end.and_then(parse_utc)) {
        (Some(start), Some(end)) => {
            let ms = (end - start).num_milliseconds();
            // ceil for positive spans, toward zero otherwise
            if ms > 0 {
                (ms + MS_PER_DAY - 1) / MS_PER_DAY
            } else {
                ms / MS_PER_DAY
            }
        }
        _ => 0,
    }
}

/// Local timezone offset as "+HH:MM"
pub fn timezone_offset() -> String {
    offset_label(Local::now().offset().local_minus_utc())
}

fn offset_label(seconds_east: i32) -> String {
    let sign = if seconds_east < 0 { '-' } else { '+' };
    let minutes = seconds_east.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn iso(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339()
    }

    #[test]
    fn test_time_ago_minutes() {
        let now = Utc::now();
        let ts = iso(now - Duration::seconds(90));
        assert_eq!(time_ago(Some(&ts), now), "1m ago");
    }

    #[test]
    fn test_time_ago_hours_and_days() {
        let now = Utc::now();
        let ts = iso(now - Duration::hours(3) - Duration::minutes(5));
        assert_eq!(time_ago(Some(&ts), now), "3h ago");

        let ts = iso(now - Duration::hours(25));
        assert_eq!(time_ago(Some(&ts), now), "1d ago");
    }

    #[test]
    fn test_time_ago_naive_is_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(time_ago(Some("2024-03-10T10:00:00"), now), "2h ago");
        assert_eq!(time_ago(Some("2024-03-10 11:30:00.123"), now), "30m ago");
        assert_eq!(time_ago(Some("2024-03-10T12:00:00+02:00"), now), "2h ago");
    }

    #[test]
    fn test_time_ago_unknown() {
        let now = Utc::now();
        assert_eq!(time_ago(None, now), "Unknown");
        assert_eq!(time_ago(Some(""), now), "Unknown");
        assert_eq!(time_ago(Some("yesterday-ish"), now), "Unknown");
    }

    #[test]
    fn test_just_now() {
        let now = Utc::now();
        let ts = iso(now - Duration::seconds(20));
        assert_eq!(time_ago_or_just_now(Some(&ts), now), "Just now");

        let ts = iso(now - Duration::minutes(5));
        assert_eq!(time_ago_or_just_now(Some(&ts), now), "5m ago");
    }

    #[test]
    fn test_format_in_utc() {
        assert_eq!(
            format_timestamp_in(Some("2024-01-05T08:09:10Z"), &Utc),
            "2024-01-05 08:09:10"
        );
        assert_eq!(format_date_in(Some("2024-01-05T23:59:00"), &Utc), "2024-01-05");
        assert_eq!(format_date_in(None, &Utc), "Unknown");
    }

    #[test]
    fn test_calculate_duration() {
        assert_eq!(
            calculate_duration(Some("2024-01-01T00:00:00Z"), Some("2024-01-01T00:45:00Z")),
            "45m"
        );
        assert_eq!(
            calculate_duration(Some("2024-01-01T00:00:00Z"), Some("2024-01-01T05:00:00Z")),
            "5h"
        );
        assert_eq!(
            calculate_duration(Some("2024-01-01T00:00:00Z"), Some("2024-01-04T01:00:00Z")),
            "3d"
        );
        assert_eq!(calculate_duration(None, Some("2024-01-01")), "Unknown");
    }

    #[test]
    fn test_days_between_rounds_up() {
        assert_eq!(
            days_between(Some("2024-01-01T00:00:00Z"), Some("2024-01-02T01:00:00Z")),
            2
        );
        assert_eq!(days_between(Some("2024-01-01"), Some("2024-01-01")), 0);
        assert_eq!(days_between(None, Some("2024-01-01")), 0);
    }

    #[test]
    fn test_offset_label() {
        assert_eq!(offset_label(0), "+00:00");
        assert_eq!(offset_label(5 * 3600 + 1800), "+05:30");
        assert_eq!(offset_label(-8 * 3600), "-08:00");
    }
}
