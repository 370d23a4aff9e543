//! Utility functions for the clue_forecast crate

use crate::data::Frequency;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Offset-aware layouts tried after RFC 3339
const ZONED_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// Naive date-time layouts, interpreted as UTC
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts, interpreted as midnight UTC
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Parse a timestamp cell into a UTC instant.
///
/// Accepts RFC 3339, the common date and date-time layouts listed above, and
/// integer epoch values (seconds, or milliseconds when 12 digits or more).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }

    // Short integers are more likely years or ids than epochs
    if s.len() >= 9 && s.chars().all(|c| c.is_ascii_digit() || c == '-') {
        if let Ok(epoch) = s.parse::<i64>() {
            return if s.trim_start_matches('-').len() >= 12 {
                Utc.timestamp_millis_opt(epoch).single()
            } else {
                Utc.timestamp_opt(epoch, 0).single()
            };
        }
    }

    None
}

/// Create the `horizon` timestamps that follow `last_timestamp`
pub fn future_timestamps(
    last_timestamp: DateTime<Utc>,
    horizon: usize,
    frequency: &Frequency,
) -> Vec<DateTime<Utc>> {
    let mut timestamps = Vec::with_capacity(horizon);
    let mut current = last_timestamp;

    for _ in 0..horizon {
        current = frequency.next(current);
        timestamps.push(current);
    }

    timestamps
}
