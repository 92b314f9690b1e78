use crate::model::{Deal, DealsPage, FetchError, MarketItem, PaginationMeta};
use crate::normalizer::normalize_records;
use crate::scraper::traits::DealSource;

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the deals/sales API.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) BrickDeals/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn deals_url(&self, page: u32, size: u32) -> String {
        format!("{}/deals?page={}&size={}", self.base_url, page, size)
    }

    fn sales_url(&self, lego_set_id: &str) -> String {
        format!("{}/sales?id={}", self.base_url, lego_set_id)
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        response.json::<Value>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

#[async_trait::async_trait]
impl DealSource for ApiClient {
    async fn fetch_deals(&self, page: u32, size: u32) -> Result<DealsPage, FetchError> {
        let body = self.get_json(&self.deals_url(page, size)).await?;
        parse_deals_response(body)
    }

    async fn fetch_sales(&self, lego_set_id: &str) -> Result<Vec<MarketItem>, FetchError> {
        let body = self.get_json(&self.sales_url(lego_set_id)).await?;
        parse_sales_response(body)
    }
}

/// Unwraps `{ success, data }`; anything but `success: true` is a logical
/// failure.
fn unwrap_envelope(mut body: Value) -> Result<Value, FetchError> {
    if body.get("success").and_then(Value::as_bool) != Some(true) {
        let reason = body.get("error")
            .or_else(|| body.get("message"))
            .map(|v| v.to_string())
            .unwrap_or_else(|| "success flag not set".into());
        warn!("API reported failure: {}", reason);
        return Err(FetchError::Logical(reason));
    }
    body.get_mut("data")
        .map(Value::take)
        .ok_or_else(|| FetchError::Malformed("missing data".into()))
}

/// Turns a deals response body into a page. `data.result` and `data.meta`
/// are both required.
pub fn parse_deals_response(body: Value) -> Result<DealsPage, FetchError> {
    let mut data = unwrap_envelope(body)?;

    let result = match data.get_mut("result").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => return Err(FetchError::Malformed("missing result array".into())),
    };
    let meta = match data.get_mut("meta").map(Value::take) {
        Some(meta @ Value::Object(_)) => meta,
        _ => return Err(FetchError::Malformed("missing meta".into())),
    };
    let pagination: PaginationMeta = serde_json::from_value(meta)
        .map_err(|e| FetchError::Malformed(format!("bad meta: {}", e)))?;

    let deals: Vec<Deal> = normalize_records(result);
    Ok(DealsPage {
        deals,
        pagination: pagination.normalized(),
    })
}

/// Turns a sales response body into listings. Accepts `data.result` or a
/// bare `data` array.
pub fn parse_sales_response(body: Value) -> Result<Vec<MarketItem>, FetchError> {
    let mut data = unwrap_envelope(body)?;
    let result = data.get_mut("result").map(Value::take);
    let items = match result {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(FetchError::Malformed("result is not an array".into())),
        None => match data {
            Value::Array(items) => items,
            _ => return Err(FetchError::Malformed("missing result array".into())),
        },
    };
    Ok(normalize_records(items))
}
