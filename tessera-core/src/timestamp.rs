use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{CoreError, CoreResult};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses an event timestamp.
///
/// Accepts RFC 3339, naive date-times (`2025-03-01T18:30`, with or without
/// seconds) and plain dates (`2025-03-01`, midnight). Naive values are UTC.
pub fn parse_event_timestamp(field: &str, raw: &str) -> CoreResult<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::validation(format!("{} is required.", field)));
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(CoreError::validation(format!("{} is not a valid date: {}", field, raw)))
}
