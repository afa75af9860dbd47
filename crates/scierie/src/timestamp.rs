//! Timestamp conventions.
//!
//! Dates are stored as `YYYY-MM-DD HH:MM:SS` UTC text so that SQLite's
//! `strftime` can bucket them and lexical order equals chronological order.
//! JSON carries them as RFC 3339.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use rusqlite::types::Type;

/// Storage format for every date column.
pub const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The current time, truncated to whole seconds so it survives a round trip
/// through the database unchanged.
#[must_use]
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Format a timestamp for storage.
#[must_use]
pub fn to_db(value: DateTime<Utc>) -> String {
    value.format(DB_FORMAT).to_string()
}

/// Format the first instant of a calendar day for storage.
#[must_use]
pub fn day_start(day: NaiveDate) -> String {
    format!("{} 00:00:00", day.format("%Y-%m-%d"))
}

/// Parse a stored timestamp.
///
/// # Errors
///
/// Returns a conversion error when the text isn't in [`DB_FORMAT`].
pub fn from_db(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, DB_FORMAT).map(|naive| naive.and_utc())
}

/// Read a timestamp column from a row.
///
/// # Errors
///
/// Returns an error if the column is missing or not a valid stored timestamp.
pub fn column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    from_db(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse a date supplied by a client.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM:SS` and a
/// bare `YYYY-MM-DD` (midnight UTC), which is what HTML date inputs send.
#[must_use]
pub fn parse_input(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        let dt = dt.with_timezone(&Utc);
        return Some(dt.with_nanosecond(0).unwrap_or(dt));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", DB_FORMAT] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_db_round_trip_keeps_seconds() {
        let value = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let stored = to_db(value);
        assert_eq!(stored, "2025-03-14 09:26:53");
        assert_eq!(from_db(&stored).unwrap(), value);
    }

    #[test]
    fn test_now_has_no_subsecond_part() {
        assert_eq!(now().nanosecond(), 0);
    }

    #[test]
    fn test_day_start() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(day_start(day), "2025-01-05 00:00:00");
    }

    #[test]
    fn test_parse_input_date_only() {
        let parsed = parse_input("2025-02-10").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_input_rfc3339_with_offset() {
        let parsed = parse_input("2025-02-10T12:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 2, 10, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_input_datetime_local() {
        let parsed = parse_input("2025-02-10T08:15").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 2, 10, 8, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_input_rejects_garbage() {
        assert!(parse_input("hier").is_none());
        assert!(parse_input("").is_none());
        assert!(parse_input("2025-13-01").is_none());
    }
}
