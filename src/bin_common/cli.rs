//! CLI utilities for binaries
//!
//! Handles configuration path resolution and command line arguments
//! for all binary executables.

use std::path::PathBuf;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "WATCH_CONFIG_PATH";

/// Config file used when [`CONFIG_PATH_ENV`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/watch_config.yaml";

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use coincap_watch::bin_common::load_config_from_env;
///
/// let path = load_config_from_env();
/// ```
pub fn load_config_from_env() -> PathBuf {
    config_path_from(std::env::var(CONFIG_PATH_ENV).ok())
}

/// Resolve the config path from an optional override
pub fn config_path_from(value: Option<String>) -> PathBuf {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// Asset names from arguments, accepting both `a b` and `a,b`
pub fn parse_favorites(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
