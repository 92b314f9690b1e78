// Shared fixtures for analyzer and state tests.
use crate::model::{Deal, MarketItem};
use crate::normalizer::normalize_records;
use serde_json::Value;

const VINTED_43230: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/vinted_43230.json"));
pub const DEALS_PAGE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/deals_page.json"));

/// The 40-item resale listing for set 43230.
pub fn vinted_listing() -> Vec<MarketItem> {
    let raw: Vec<Value> = serde_json::from_str(VINTED_43230).expect("fixture is valid JSON");
    normalize_records(raw)
}

pub fn deal(uuid: &str, price: Option<f64>, discount: Option<f64>) -> Deal {
    Deal {
        id: "43230".into(),
        uuid: uuid.into(),
        title: format!("deal {}", uuid),
        link: format!("https://example.com/{}", uuid),
        price,
        discount,
        comments: None,
        temperature: None,
        community: None,
        website: None,
        published: None,
    }
}
