//! Date/time parsing against configured `strftime` formats.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parse `value` with a single format.
///
/// Date-only formats yield midnight of that day.
pub fn parse_with_format(value: &str, format: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(trimmed, format)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Parse `value` with the first matching format of `formats`.
pub fn parse_any(value: &str, formats: &[String]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|format| parse_with_format(value, format))
}

/// Milliseconds since the Unix epoch, the physical value of a
/// `Datetime(Milliseconds)` column.
pub fn to_epoch_millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}
