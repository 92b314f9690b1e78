use crate::model::{DealsPage, FetchError, MarketItem};

/// Remote source of deals and resale listings.
#[async_trait::async_trait]
pub trait DealSource: Send + Sync {
    /// One page of deals; `page` starts at 1.
    async fn fetch_deals(&self, page: u32, size: u32) -> Result<DealsPage, FetchError>;

    /// Current resale listings for a lego set id.
    async fn fetch_sales(&self, lego_set_id: &str) -> Result<Vec<MarketItem>, FetchError>;
}
