//! Coin Watcher
//!
//! Terminal UI showing one page of CoinCap assets with favorites, and a
//! live watchlist of trades on favorited assets.

pub mod app;
pub mod state;
pub mod ui;

pub use app::{Action, App};
pub use state::{FetchState, PageResponse, StreamStatus, WatchState};
