// Analyzer module: statistics and derived views over deals and resale listings.

pub mod price_analysis;
pub mod market_indicators;
pub mod lifecycle;

#[cfg(test)]
pub mod testing;

pub use market_indicators::{DealFilter, GroupedCollection, SortOrder, UNKNOWN_GROUP};
pub use price_analysis::MarketSummary;
