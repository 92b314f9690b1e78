use crate::model::Dealer;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const CONFIG_PATH_ENV: &str = "BRICK_DEALS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Thresholds behind the named filters and the old-listing check.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub best_discount: f64,
    pub most_commented: f64,
    pub hot_temperature: f64,
    pub old_listing_days: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            best_discount: 30.0,
            most_commented: 5.0,
            hot_temperature: 100.0,
            old_listing_days: 21,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_seconds: u64,
    pub storage_path: String,
    pub favorite_dealers: Vec<Dealer>,
    pub thresholds: Thresholds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://lego-api-blue.vercel.app".into(),
            page_size: 6,
            request_timeout_seconds: 10,
            storage_path: "data.db".into(),
            favorite_dealers: vec![
                Dealer {
                    name: "Dealabs".into(),
                    url: "https://www.dealabs.com/groupe/lego".into(),
                },
                Dealer {
                    name: "Avenue de la brique".into(),
                    url: "https://www.avenuedelabrique.com/promotions-et-bons-plans-lego".into(),
                },
            ],
            thresholds: Thresholds::default(),
        }
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Loads the config at `path`, or the defaults when the file does not exist.
pub fn load_or_default(path: &str) -> Result<AppConfig, ConfigError> {
    if Path::new(path).exists() {
        load_config(path)
    } else {
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"page_size": 12, "thresholds": {"best_discount": 50}}"#).unwrap();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.thresholds.best_discount, 50.0);
        assert_eq!(config.thresholds.hot_temperature, 100.0);
        assert_eq!(config.favorite_dealers.len(), 2);
        assert_eq!(config.api_base_url, "https://lego-api-blue.vercel.app");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = load_or_default("definitely/not/here/config.json").unwrap();
        assert_eq!(config.page_size, 6);
        assert!(matches!(load_config("definitely/not/here/config.json"), Err(ConfigError::Io(_))));
    }
}
