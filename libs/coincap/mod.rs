//! CoinCap Watcher Library
//!
//! Browse CoinCap assets page by page, mark favorites, and follow live
//! trades on them.
//!
//! ## Architecture
//!
//! - **domain**: Assets, favorites, trades, watchlist and pagination rules
//! - **infrastructure**: REST and WebSocket clients, config, logging
//! - **application**: The terminal watcher (state, keys, rendering)
//! - **utils**: Shutdown handling

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod utils;

pub use application::watch::{App, WatchState};
pub use domain::{
    Asset, Favorites, Pagination, SharedFavorites, TradeEvent, Watchlist, WatchlistEntry,
    PAGE_SIZE, WATCHLIST_CAPACITY,
};
pub use infrastructure::{
    init_file_tracing, init_tracing, init_tracing_with_level, AssetPage, AssetsApiError,
    AssetsClient, ConfigError, TradeStream, TradeStreamConfig, WatchConfig,
};
pub use utils::ShutdownManager;
