use crate::traits::*;
use crossbeam_channel::Sender;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for the WebSocket handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings shared by every connection the client opens.
///
/// The route senders live here, so each new connection feeds the same
/// handler threads as the previous one.
pub struct ClientConfig<R>
where
    R: MessageRouter,
{
    /// WebSocket URL (wss:// or ws://)
    pub(crate) url: String,

    /// Message router for parsing and routing messages
    pub(crate) router: Arc<R>,

    /// Channel senders mapped by route key
    pub(crate) route_senders: HashMap<R::RouteKey, Sender<R::Message>>,

    /// Messages sent right after every successful connection
    pub(crate) subscriptions: Vec<WsMessage>,

    /// Handshake timeout
    pub(crate) connect_timeout: Duration,

    /// true = keep running, false = shutdown requested
    pub(crate) shutdown_flag: Arc<AtomicBool>,
}

impl<R> ClientConfig<R>
where
    R: MessageRouter,
{
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn handler_count(&self) -> usize {
        self.route_senders.len()
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}
