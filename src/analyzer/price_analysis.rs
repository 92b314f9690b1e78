use crate::analyzer::lifecycle::{has_record_older_than, oldest_age};
use crate::model::{Field, Record, StatsError};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

/// Values of `field` across `records`, in input order, skipping records
/// where the field is missing or failed to parse.
pub fn field_values<R: Record>(records: &[R], field: Field) -> Vec<f64> {
    records.iter().filter_map(|r| r.value(field)).collect()
}

/// Arithmetic mean of `field`. Fails with `EmptyInput` when no record
/// carries a usable value.
pub fn average<R: Record>(records: &[R], field: Field) -> Result<f64, StatsError> {
    let values = field_values(records, field);
    if values.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Nearest-rank percentile: the value at `floor(n * p)` of the ascending
/// sequence, with the index clamped to the last element for `p = 1`.
pub fn percentile<R: Record>(records: &[R], field: Field, p: f64) -> Result<f64, StatsError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidArgument(format!(
            "percentile must be within [0, 1], got {}",
            p
        )));
    }
    let mut values = field_values(records, field);
    if values.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    // stable, and total even for values the normalizer let through
    values.sort_by(|a, b| a.total_cmp(b));
    let index = ((values.len() as f64 * p).floor() as usize).min(values.len() - 1);
    Ok(values[index])
}

/// Largest value of `field`, or `0.0` for an empty collection.
pub fn max_by<R: Record>(records: &[R], field: Field) -> f64 {
    field_values(records, field)
        .into_iter()
        .reduce(f64::max)
        .unwrap_or(0.0)
}

/// Population standard deviation of `field`.
pub fn std_dev<R: Record>(records: &[R], field: Field) -> Result<f64, StatsError> {
    let avg = average(records, field)?;
    let values = field_values(records, field);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Highest potential profit from buying at `purchase_price` and reselling
/// at the best price seen in `listing`.
pub fn profitability<R: Record>(listing: &[R], purchase_price: f64) -> f64 {
    max_by(listing, Field::Price) - purchase_price
}

/// Price summary of a resale listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSummary {
    pub count: usize,
    pub average: f64,
    pub std_dev: f64,
    pub p5: f64,
    pub p25: f64,
    pub max: f64,
    pub has_old_listing: bool,
    pub oldest_listing_age: Option<Duration>,
}

impl MarketSummary {
    /// Builds the summary over `records`; listings older than `max_age`
    /// relative to `now` flip `has_old_listing`.
    pub fn compute<R: Record>(
        records: &[R],
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, StatsError> {
        Ok(Self {
            count: field_values(records, Field::Price).len(),
            average: average(records, Field::Price)?,
            std_dev: std_dev(records, Field::Price)?,
            p5: percentile(records, Field::Price, 0.05)?,
            p25: percentile(records, Field::Price, 0.25)?,
            max: max_by(records, Field::Price),
            has_old_listing: has_record_older_than(records, max_age, now),
            oldest_listing_age: oldest_age(records, now),
        })
    }
}

/// Total order over optional numbers: present values ascending, missing
/// values after them.
pub fn cmp_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
