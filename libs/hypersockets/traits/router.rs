//! Message Routing
//!
//! ```text
//! WebSocket -> Router::parse -> Route Key -> Channel -> Handler thread
//!                                   |
//!                              Trades  -> TradesHandler (sequential)
//!                              Status  -> StatusHandler (sequential)
//! ```
//!
//! # Ordering Guarantees
//!
//! - Messages are parsed in the order they arrive on the socket
//! - Messages with the same route key are handled in that order
//! - Different route keys are handled on different threads
//! - Routes are registered once per client and survive reconnections

use crate::{Result, WsMessage};
use async_trait::async_trait;
use std::fmt::Debug;
use std::hash::Hash;

/// Parses raw WebSocket messages and decides which handler gets them
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum Route {
///     Trades,
/// }
///
/// struct TradeRouter;
///
/// #[async_trait]
/// impl MessageRouter for TradeRouter {
///     type Message = Trade;
///     type RouteKey = Route;
///
///     async fn parse(&self, message: WsMessage) -> Result<Self::Message> {
///         let text = message.as_text().ok_or_else(|| HyperSocketError::ParseError("binary".into()))?;
///         serde_json::from_str(text).map_err(|e| HyperSocketError::ParseError(e.to_string()))
///     }
///
///     fn route_key(&self, _message: &Self::Message) -> Self::RouteKey {
///         Route::Trades
///     }
/// }
/// ```
#[async_trait]
pub trait MessageRouter: Send + Sync + 'static {
    /// The parsed message type
    type Message: Send + Debug + 'static;

    /// The route key type (determines which handler processes the message)
    type RouteKey: Hash + Eq + Clone + Send + Sync + Debug + 'static;

    /// Parse a raw WebSocket message into a typed message
    ///
    /// Errors are logged by the client and the message is dropped.
    /// They never close the connection.
    async fn parse(&self, message: WsMessage) -> Result<Self::Message>;

    /// Extract the route key from a parsed message
    fn route_key(&self, message: &Self::Message) -> Self::RouteKey;
}

/// Processes routed messages sequentially on a dedicated OS thread
///
/// **Important**: `handle` runs outside the async runtime. It must not
/// block on async code.
///
/// # Errors
/// A returned error is logged and the handler keeps receiving messages.
pub trait MessageHandler<M>: Send + 'static
where
    M: Send + Debug + 'static,
{
    fn handle(&mut self, message: M) -> Result<()>;
}
