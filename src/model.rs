// Core structs: Deal, MarketItem, PaginationMeta
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalizer::{lenient_discount, lenient_f64, lenient_price, lenient_string, lenient_timestamp};

/// A discounted product listing as returned by the deals endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    /// Lego set id, e.g. "43230".
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub uuid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    /// Percentage in [0, 100]; `None` means unknown, never zero.
    #[serde(default, deserialize_with = "lenient_discount")]
    pub discount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub comments: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published: Option<DateTime<Utc>>,
}

/// A resale listing used for price comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub uuid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub favorite: bool,
}

impl MarketItem {
    /// Returns a copy flagged as favorite; `self` is left untouched.
    pub fn with_favorite(&self) -> MarketItem {
        MarketItem {
            favorite: true,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    #[serde(default = "one")]
    pub current_page: u32,
    #[serde(default = "one")]
    pub page_count: u32,
    #[serde(default = "one")]
    pub page_size: u32,
    #[serde(default, alias = "count")]
    pub total_count: u64,
}

fn one() -> u32 {
    1
}

impl Default for PaginationMeta {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_count: 1,
            page_size: 1,
            total_count: 0,
        }
    }
}

impl PaginationMeta {
    /// Forces every field back into its valid domain. `current_page` is
    /// clamped to `page_count` rather than rejected.
    pub fn normalized(self) -> Self {
        let page_count = self.page_count.max(1);
        Self {
            current_page: self.current_page.clamp(1, page_count),
            page_count,
            page_size: self.page_size.max(1),
            total_count: self.total_count,
        }
    }
}

/// One page of deals plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DealsPage {
    pub deals: Vec<Deal>,
    pub pagination: PaginationMeta,
}

/// A favorite shopping community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dealer {
    pub name: String,
    pub url: String,
}

/// Numeric fields an aggregate can be computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Price,
    Discount,
    Comments,
    Temperature,
}

/// Anything the statistics engine can aggregate.
pub trait Record: Clone {
    /// Numeric value of `field`, `None` when missing or unparseable.
    fn value(&self, field: Field) -> Option<f64>;
    fn published(&self) -> Option<DateTime<Utc>>;
    fn uuid(&self) -> &str;
}

impl Record for Deal {
    fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Price => self.price,
            Field::Discount => self.discount,
            Field::Comments => self.comments,
            Field::Temperature => self.temperature,
        }
    }

    fn published(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    fn uuid(&self) -> &str {
        &self.uuid
    }
}

impl Record for MarketItem {
    fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Price => self.price,
            _ => None,
        }
    }

    fn published(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    fn uuid(&self) -> &str {
        &self.uuid
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("aggregate requested over zero records")]
    EmptyInput,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("api reported failure: {0}")]
    Logical(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid request: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
