use hypersockets::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_REST_URL: &str = "https://api.coincap.io";
pub const DEFAULT_WS_URL: &str = "wss://ws.coincap.io/trades/binance";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Watcher configuration
///
/// Every field has a default, so an empty or absent YAML file yields a
/// working setup against the public CoinCap endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub api: ApiConfig,
    pub stream: StreamConfig,
    pub ui: UiConfig,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Log file used by the terminal UI
    pub log_file: PathBuf,

    /// API key from .env (not in YAML)
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub rest_url: String,
    pub ws_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub reconnect_initial_delay_ms: u64,
    pub reconnect_max_delay_ms: u64,
    /// `None` retries forever
    pub reconnect_max_attempts: Option<usize>,
    /// Proportional jitter in `[0, 1]`
    pub reconnect_jitter: f64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            stream: StreamConfig::default(),
            ui: UiConfig::default(),
            log_level: "info".to_string(),
            log_file: PathBuf::from("logs/coincap-watch.log"),
            api_key: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rest_url: DEFAULT_REST_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_initial_delay_ms: 500,
            reconnect_max_delay_ms: 30_000,
            reconnect_max_attempts: Some(10),
            reconnect_jitter: 0.2,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 50 }
    }
}

impl WatchConfig {
    /// Load configuration from a YAML file, then apply environment overrides
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml(&yaml_content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Like [`WatchConfig::load`], but a missing file means defaults
    pub fn load_or_default(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        if config_path.exists() {
            return Self::load(config_path);
        }

        info!(
            "Config file {} not found, using defaults",
            config_path.display()
        );
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without touching the environment
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("COINCAP_REST_URL") {
            info!("Overriding REST URL from environment variable");
            self.api.rest_url = url;
        }
        if let Some(url) = lookup("COINCAP_WS_URL") {
            info!("Overriding WebSocket URL from environment variable");
            self.api.ws_url = url;
        }
        if let Some(key) = lookup("COINCAP_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = level;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let rest_url = self.api.rest_url.trim();
        if rest_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api.rest_url must not be empty".to_string(),
            ));
        }
        if !rest_url.starts_with("http://") && !rest_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "api.rest_url must be http(s), got {}",
                rest_url
            )));
        }

        let ws_url = self.api.ws_url.trim();
        if ws_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api.ws_url must not be empty".to_string(),
            ));
        }
        if !ws_url.starts_with("ws://") && !ws_url.starts_with("wss://") {
            return Err(ConfigError::ValidationError(format!(
                "api.ws_url must be ws:// or wss://, got {}",
                ws_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.stream.connect_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "stream.connect_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.stream.reconnect_jitter) {
            return Err(ConfigError::ValidationError(
                "stream.reconnect_jitter must be between 0 and 1".to_string(),
            ));
        }

        if self.stream.reconnect_initial_delay_ms > self.stream.reconnect_max_delay_ms {
            return Err(ConfigError::ValidationError(
                "stream.reconnect_initial_delay_ms must not exceed reconnect_max_delay_ms"
                    .to_string(),
            ));
        }

        if self.ui.tick_rate_ms == 0 {
            return Err(ConfigError::ValidationError(
                "ui.tick_rate_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.stream.connect_timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms)
    }

    /// Backoff used by the trade stream between reconnection attempts
    pub fn reconnect_strategy(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_millis(self.stream.reconnect_initial_delay_ms),
            Duration::from_millis(self.stream.reconnect_max_delay_ms),
            self.stream.reconnect_max_attempts,
        )
        .with_jitter(self.stream.reconnect_jitter)
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  REST URL: {}", self.api.rest_url);
        info!("  WebSocket URL: {}", self.api.ws_url);
        info!("  Request timeout: {}s", self.api.timeout_secs);
        info!(
            "  Reconnect: {}ms..{}ms, max attempts {:?}, jitter {}",
            self.stream.reconnect_initial_delay_ms,
            self.stream.reconnect_max_delay_ms,
            self.stream.reconnect_max_attempts,
            self.stream.reconnect_jitter
        );
        info!("  API key: {}", if self.api_key.is_some() { "set" } else { "none" });
        info!("  Log level: {}", self.log_level);
    }
}
