//! CoinCap trade stream
//!
//! Listens on `wss://ws.coincap.io/trades/{exchange}`, keeps trades whose
//! base asset is a favorite and publishes the bounded watchlist.

pub mod types;
pub mod websocket;

pub use types::TradeRoute;
pub use websocket::{TradeStream, TradeStreamConfig, TradesHandler, TradesRouter};
