//! Infrastructure Layer
//!
//! REST and WebSocket clients, configuration loading and logging setup.

pub mod client;
pub mod config;
pub mod logging;

pub use client::assets::{AssetPage, AssetsApiError, AssetsClient};
pub use client::trades::{TradeStream, TradeStreamConfig, TradesHandler, TradesRouter};
pub use config::{ConfigError, WatchConfig};
pub use logging::{init_file_tracing, init_tracing, init_tracing_with_level};
