//! # HyperSockets Traits
//!
//! Core traits and types used by the client:
//!
//! - **MessageRouter**: Parse incoming messages and pick a route
//! - **MessageHandler**: Consume routed messages sequentially
//! - **ReconnectionStrategy**: Control reconnection behavior

pub mod error;
pub mod parser;
pub mod reconnect;
pub mod router;

// Re-export commonly used types
pub use error::{HyperSocketError, Result};
pub use parser::WsMessage;
pub use reconnect::{ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy};
pub use router::{MessageHandler, MessageRouter};
