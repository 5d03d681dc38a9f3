//! Client core: builder, connection loop and shared state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hypersockets::core::*;
//!
//! let client = hypersockets::builder()
//!     .url("wss://ws.coincap.io/trades/binance")
//!     .router(TradeRouter, |routing| routing.handler(Route::Trades, TradeHandler::new()))
//!     .reconnect_strategy(
//!         ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(30), Some(10))
//!             .with_jitter(0.2),
//!     )
//!     .build()
//!     .await?;
//!
//! while let Some(event) = client.try_recv_event() {
//!     println!("Event: {:?}", event);
//! }
//!
//! client.shutdown().await?;
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;

// Re-export main types
pub use builder::{states, RoutingBuilder, WebSocketClientBuilder};
pub use client::{ClientEvent, Metrics, WebSocketClient};
pub use config::ClientConfig;
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new WebSocket client builder
pub fn builder() -> WebSocketClientBuilder<builder::states::NoUrl, builder::states::NoRouter, ()> {
    WebSocketClientBuilder::new()
}
