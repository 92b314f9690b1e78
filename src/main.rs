use brick_deals::config::{load_or_default, AppConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use brick_deals::console::command_handler::{render_state, HELP};
use brick_deals::console::listener::listen_for_commands;
use brick_deals::console::{ConsoleContext, FAVORITE_DEALERS_KEY};
use brick_deals::scraper::{ApiClient, FetchCoordinator};
use brick_deals::storage::SqliteStorage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config: Arc<AppConfig> = match load_or_default(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };
    info!("Using API at {}", config.api_base_url);

    let storage = match SqliteStorage::new(&config.storage_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return;
        }
    };

    if let Err(e) = storage.lock().await.set_json(FAVORITE_DEALERS_KEY, &config.favorite_dealers) {
        warn!("Saving favorite dealers failed: {}", e);
    } else {
        info!("Saved {} favorite dealers", config.favorite_dealers.len());
    }

    let client = match ApiClient::new(&config.api_base_url, Duration::from_secs(config.request_timeout_seconds)) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };
    let coordinator = Arc::new(FetchCoordinator::new(client));

    info!("Loading first page...");
    let report = coordinator.fetch_page(1, config.page_size).await;
    if let Some(e) = report.error() {
        warn!("Initial fetch failed: {}", e);
    }
    {
        let state = coordinator.state();
        println!("{}", render_state(&*state.lock().await));
    }
    println!("{}", HELP);

    let ctx = ConsoleContext::new(coordinator, storage, config);
    listen_for_commands(&ctx).await;
    info!("Bye.");
}
