// Utility functions
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parses a decimal price such as `"48.99"`, `"48,99 €"` or `" 5 "`.
/// Non-finite results are rejected.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let cleaned = text.replace('€', "").trim().replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts a unix timestamp to `DateTime<Utc>`. Values above 1e11 are read
/// as milliseconds.
pub fn from_unix(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value.abs() > 1e11 { value } else { value * 1000.0 };
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Parses a timestamp string in any of the formats the APIs hand out:
/// RFC 3339, RFC 2822 (`Thu, 09 Jan 2025 07:52:33 GMT`), a naive
/// `YYYY-MM-DD HH:MM:SS`, a bare date or a numeric unix timestamp.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    text.parse::<f64>().ok().and_then(from_unix)
}

/// Sort key for dates: an invalid date is pinned to the unix epoch.
pub fn instant_or_epoch(published: Option<DateTime<Utc>>) -> DateTime<Utc> {
    published.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
