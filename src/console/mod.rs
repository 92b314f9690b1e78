pub mod command_handler;
pub mod listener;
pub mod report;

use crate::config::AppConfig;
use crate::scraper::{DealSource, FetchCoordinator};
use crate::storage::SqliteStorage;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Storage key under which the favorite dealers are kept.
pub const FAVORITE_DEALERS_KEY: &str = "MY_FAVORITE_DEALERS";

/// Everything a console command may touch.
pub struct ConsoleContext<S: DealSource> {
    pub coordinator: Arc<FetchCoordinator<S>>,
    pub storage: Arc<Mutex<SqliteStorage>>,
    pub config: Arc<AppConfig>,
    pub start_time: Instant,
}

impl<S: DealSource> ConsoleContext<S> {
    pub fn new(
        coordinator: Arc<FetchCoordinator<S>>,
        storage: Arc<Mutex<SqliteStorage>>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            coordinator,
            storage,
            config,
            start_time: Instant::now(),
        }
    }
}
