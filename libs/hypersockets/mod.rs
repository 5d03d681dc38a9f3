//! # HyperSockets
//!
//! A small, modular WebSocket client used by the trade stream.
//!
//! ## Features
//!
//! - **Type-state builder**: URL and router are required at compile time
//! - **Persistent routing**: handlers are registered once and stay attached
//!   across every reconnection
//! - **Ordered delivery**: messages are parsed in arrival order and routed to
//!   per-key handler threads
//! - **Pluggable reconnection**: exponential backoff with jitter, fixed delay,
//!   or never

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use core::{
    builder, client, config, connection_state,
    builder::{states, RoutingBuilder, WebSocketClientBuilder},
    client::{ClientEvent, Metrics, WebSocketClient},
    config::ClientConfig,
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
};

// Convenience function
pub use core::builder as client_builder;

/// Type alias for Result with HyperSocketError
pub type Result<T> = std::result::Result<T, traits::HyperSocketError>;
