use crate::model::Record;
use chrono::{DateTime, Duration, Utc};

/// True if any record was published more than `max_age` before `now`.
/// Scans in slice order and stops at the first hit; records without a
/// parseable date are skipped.
pub fn has_record_older_than<R: Record>(records: &[R], max_age: Duration, now: DateTime<Utc>) -> bool {
    let cutoff = now - max_age;
    records
        .iter()
        .filter_map(|r| r.published())
        .any(|published| published < cutoff)
}

/// Age of the oldest dated record.
pub fn oldest_age<R: Record>(records: &[R], now: DateTime<Utc>) -> Option<Duration> {
    records.iter().filter_map(|r| r.published()).min().map(|oldest| now - oldest)
}

pub fn find_by_uuid<'a, R: Record>(records: &'a [R], uuid: &str) -> Option<&'a R> {
    records.iter().find(|r| r.uuid() == uuid)
}

/// A new listing without the record carrying `uuid`.
pub fn without_uuid<R: Record>(records: &[R], uuid: &str) -> Vec<R> {
    records.iter().filter(|r| r.uuid() != uuid).cloned().collect()
}
