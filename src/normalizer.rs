use crate::model::ParseError;
use crate::utils::{from_unix, parse_decimal, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Coerces a raw JSON value (number or numeric string) into a price.
pub fn coerce_price(value: &Value) -> Result<f64, ParseError> {
    let price = coerce_number(value).ok_or_else(|| ParseError::InvalidPrice(value.to_string()))?;
    if price < 0.0 {
        return Err(ParseError::InvalidPrice(value.to_string()));
    }
    Ok(price)
}

/// Coerces a raw JSON value (unix number or date string) into an instant.
pub fn coerce_timestamp(value: &Value) -> Result<DateTime<Utc>, ParseError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().and_then(from_unix),
        Value::String(s) => parse_timestamp(s),
        _ => None,
    };
    parsed.ok_or_else(|| ParseError::InvalidDate(value.to_string()))
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Deserializes each raw record independently. A record that fails is
/// logged and dropped; the rest of the batch survives.
pub fn normalize_records<T: DeserializeOwned>(raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                let err = ParseError::InvalidRecord(e.to_string());
                warn!("Skipping record #{}: {}", index, err);
                None
            }
        })
        .collect()
}

pub fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match coerce_price(&value) {
        Ok(price) => Ok(Some(price)),
        Err(e) => {
            warn!("{}", e);
            Ok(None)
        }
    }
}

/// Discounts outside [0, 100] are treated as unknown.
pub fn lenient_discount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value).filter(|d| (0.0..=100.0).contains(d)))
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match coerce_timestamp(&value) {
        Ok(ts) => Ok(Some(ts)),
        Err(e) => {
            warn!("{}", e);
            Ok(None)
        }
    }
}

/// Text fields sent as strings or as numbers; `null` reads as empty.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        scalar @ (Value::Number(_) | Value::Bool(_)) => Ok(scalar.to_string()),
        other => Err(serde::de::Error::custom(format!("expected a string, got {}", other))),
    }
}
