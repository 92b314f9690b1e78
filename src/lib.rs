// Deal catalog browser: fetches paginated deals, keeps the canonical page and
// derives filtered, sorted and grouped views plus resale statistics.

pub mod analyzer;
pub mod config;
pub mod console;
pub mod model;
pub mod normalizer;
pub mod scraper;
pub mod state;
pub mod storage;
pub mod utils;
