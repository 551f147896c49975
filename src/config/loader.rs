//! Configuration Loader
//!
//! Loads and validates configuration from an optional TOML file. Every
//! section and field has a built-in default, so an absent file or a partial
//! file is fine.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::dexscreener::{DexScreenerConfig, DEXSCREENER_BASE_URL};
use crate::application::market_service::{
    MarketConfig, DEFAULT_CHAINS, DEFAULT_DASHBOARD_LIMIT, DEFAULT_TOKEN_LIST_LIMIT,
};
use crate::domain::aggregator::DEFAULT_MIN_VOLUME_USD;

/// Default config file location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/dexwatch.toml";

/// Environment variable overriding `[api].base_url`
pub const BASE_URL_ENV: &str = "DEXSCREENER_BASE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub market: MarketSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// DexScreener API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// API host, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Response cache time-to-live
    pub cache_ttl_secs: u64,
    /// Rate limiter sliding window
    pub rate_window_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEXSCREENER_BASE_URL.to_string(),
            timeout_secs: 15,
            cache_ttl_secs: 30,
            rate_window_secs: 60,
        }
    }
}

impl ApiSection {
    /// Get base URL with environment variable override
    /// Checks DEXSCREENER_BASE_URL first, falls back to config value
    pub fn get_base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.base_url.clone())
            .trim_end_matches('/')
            .to_string()
    }
}

/// Token list section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketSection {
    /// Chain names searched to build the token list
    pub chains: Vec<String>,
    /// Tokens at or below this 24h volume are dropped
    pub min_volume_usd: f64,
    pub token_list_limit: usize,
    pub dashboard_limit: usize,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            chains: DEFAULT_CHAINS.iter().map(|c| c.to_string()).collect(),
            min_volume_usd: DEFAULT_MIN_VOLUME_USD,
            token_list_limit: DEFAULT_TOKEN_LIST_LIMIT,
            dashboard_limit: DEFAULT_DASHBOARD_LIMIT,
        }
    }
}

/// Local storage section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding the watchlist and theme files, `~` is expanded
    pub data_dir: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: "~/.dexwatch".to_string(),
        }
    }
}

impl StorageSection {
    pub fn expanded_data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).into_owned())
    }
}

/// Logging section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration, using defaults when the file does not exist
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    load_config(path)
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url cannot be empty".to_string(),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.api.cache_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache_ttl_secs must be > 0".to_string(),
            ));
        }

        if self.api.rate_window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "rate_window_secs must be > 0".to_string(),
            ));
        }

        if self.market.chains.is_empty() || self.market.chains.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "chains must list at least one non-empty chain".to_string(),
            ));
        }

        if self.market.min_volume_usd.is_nan() || self.market.min_volume_usd < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_volume_usd must be >= 0, got {}",
                self.market.min_volume_usd
            )));
        }

        if self.market.token_list_limit == 0 || self.market.dashboard_limit == 0 {
            return Err(ConfigError::ValidationError(format!(
                "token_list_limit and dashboard_limit must be > 0, got {} and {}",
                self.market.token_list_limit, self.market.dashboard_limit
            )));
        }

        if self.storage.data_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "data_dir cannot be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging level must be one of {:?}, got {}",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }
}

impl From<&Config> for DexScreenerConfig {
    fn from(config: &Config) -> Self {
        DexScreenerConfig {
            base_url: config.api.get_base_url(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            cache_ttl: Duration::from_secs(config.api.cache_ttl_secs),
            rate_window: Duration::from_secs(config.api.rate_window_secs),
        }
    }
}

impl From<&Config> for MarketConfig {
    fn from(config: &Config) -> Self {
        MarketConfig {
            chains: config.market.chains.clone(),
            min_volume_usd: config.market.min_volume_usd,
            token_list_limit: config.market.token_list_limit,
            dashboard_limit: config.market.dashboard_limit,
        }
    }
}
