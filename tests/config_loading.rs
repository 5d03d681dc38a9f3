//! Integration test: Configuration utilities
//!
//! Tests config path resolution and loading the shipped config file.

use coincap_watch::bin_common::{config_path_from, load_config_from_env, parse_favorites};
use coincap_watch::coincap::infrastructure::config::{ConfigError, WatchConfig};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_default_config_path() {
    assert_eq!(config_path_from(None), PathBuf::from("config/watch_config.yaml"));
}

#[test]
fn test_config_path_from_env() {
    std::env::set_var("WATCH_CONFIG_PATH", "custom/path.yaml");
    let config_path = load_config_from_env();
    std::env::remove_var("WATCH_CONFIG_PATH");

    assert_eq!(config_path.to_str().unwrap(), "custom/path.yaml");
}

#[test]
fn test_shipped_config_is_valid() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/watch_config.yaml");
    let yaml = std::fs::read_to_string(path).unwrap();

    let config = WatchConfig::from_yaml(&yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.api.ws_url, "wss://ws.coincap.io/trades/binance");
    assert_eq!(config.stream.reconnect_max_attempts, Some(10));
}

#[test]
fn test_load_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "stream:\n  reconnect_jitter: 2.0").unwrap();

    let result = WatchConfig::load(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_favorites_from_args() {
    let args = vec!["Bitcoin,ethereum".to_string(), "solana".to_string()];
    assert_eq!(parse_favorites(&args), vec!["Bitcoin", "ethereum", "solana"]);
}
