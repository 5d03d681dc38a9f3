//! CoinCap clients: REST assets listing and the trade WebSocket

pub mod assets;
pub mod trades;
