//! Best-effort timestamp normalization.
//!
//! Export documents carry timestamps as epoch integers and in at least half a
//! dozen string shapes. Everything here returns `Option`: one unparseable
//! value out of thousands must never abort a batch scan.
//!
//! String parsing walks an ordered pattern list and the first match wins.
//! That makes ambiguous dates like `01/02/2024` resolve deterministically to
//! the US-style month-first pattern; a documented, lossy policy rather than a
//! locale guess.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Accepted year range. Values outside it are treated as parse noise
/// (version numbers, phone numbers, absurd epochs).
const YEAR_MIN: i32 = 2000;
const YEAR_MAX: i32 = 2100;

/// Datetime patterns tried in priority order.
const DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
];

/// Date-only patterns, tried after the datetime patterns. Month-first
/// numeric shapes come before any other slash/dash form.
const DATE_PATTERNS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
];

fn in_range(dt: &DateTime<Utc>) -> bool {
    use chrono::Datelike;
    (YEAR_MIN..=YEAR_MAX).contains(&dt.year())
}

/// Interpret a Unix epoch value (seconds, UTC).
///
/// Negative and out-of-range values yield `None`.
pub fn normalize_epoch(secs: i64) -> Option<DateTime<Utc>> {
    if secs < 0 {
        return None;
    }
    let dt = Utc.timestamp_opt(secs, 0).single()?;
    in_range(&dt).then_some(dt)
}

/// Parse a timestamp string against the known pattern list.
///
/// RFC 3339 strings with an explicit offset are honored; bare dates resolve
/// to midnight UTC. Returns `None` when nothing matches or the year falls
/// outside the sane range.
pub fn normalize_str(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for pattern in DATETIME_PATTERNS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            let dt = Utc.from_utc_datetime(&naive);
            return in_range(&dt).then_some(dt);
        }
    }

    // Offset-carrying forms, e.g. "2024-12-24T10:00:00Z".
    if let Ok(fixed) = DateTime::parse_from_rfc3339(raw) {
        let dt = fixed.with_timezone(&Utc);
        return in_range(&dt).then_some(dt);
    }

    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, pattern) {
            let dt = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
            return in_range(&dt).then_some(dt);
        }
    }

    None
}

/// Normalize a JSON value: integers take the epoch path, strings the pattern
/// path, everything else is unparseable.
pub fn normalize_value(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::Number(n) => normalize_epoch(n.as_i64()?),
        serde_json::Value::String(s) => normalize_str(s),
        _ => None,
    }
}

/// Display form used throughout reports: `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
