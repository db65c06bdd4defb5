// Label formatter - Time-axis labels for chart points
//
// Short spans stamp `DD mon HH:MM` where the calendar day changes and `HH:MM`
// elsewhere. Wide spans stamp `DD/MM HH:MM` on every point. Unparsable
// timestamps produce an empty label.
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Spans at or above this many hours get a uniform label on every point.
pub const UNIFORM_LABEL_SPAN_HOURS: u32 = 72;

const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601-ish timestamp into wall-clock time in its own offset.
/// Accepts RFC 3339, a trailing `Z` without seconds, naive date-times and
/// bare dates.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    let body = raw.strip_suffix('Z').unwrap_or(raw);
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(body, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(body, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn hour_minute(dt: &NaiveDateTime) -> String {
    format!("{:02}:{:02}", dt.hour(), dt.minute())
}

fn day_month_name(dt: &NaiveDateTime) -> String {
    format!(
        "{:02} {} {}",
        dt.day(),
        MONTHS_ES[dt.month0() as usize],
        hour_minute(dt)
    )
}

fn day_month_numeric(dt: &NaiveDateTime) -> String {
    format!("{:02}/{:02} {}", dt.day(), dt.month(), hour_minute(dt))
}

/// `DD/MM` stamp used to mark forecast days.
pub fn format_day_stamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| format!("{:02}/{:02}", dt.day(), dt.month()))
        .unwrap_or_default()
}

/// Label for the point at `index` given every raw timestamp of the series
/// and the active span in hours (0 is treated as unbounded).
pub fn format_label(index: usize, timestamps: &[String], span_hours: u32) -> String {
    let Some(current) = timestamps.get(index).and_then(|raw| parse_timestamp(raw)) else {
        return String::new();
    };

    if span_hours == 0 || span_hours >= UNIFORM_LABEL_SPAN_HOURS {
        return day_month_numeric(&current);
    }

    let previous = index
        .checked_sub(1)
        .and_then(|i| timestamps.get(i))
        .and_then(|raw| parse_timestamp(raw));

    match previous {
        Some(prev) if prev.date() == current.date() => hour_minute(&current),
        _ => day_month_name(&current),
    }
}

pub fn format_labels(timestamps: &[String], span_hours: u32) -> Vec<String> {
    (0..timestamps.len())
        .map(|i| format_label(i, timestamps, span_hours))
        .collect()
}
