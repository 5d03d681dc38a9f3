//! WebSocket client for the CoinCap trade feed

use super::types::TradeRoute;
use crate::domain::{
    SharedFavorites, SharedWatchlist, TradeEvent, Watchlist, WatchlistEntry, WatchlistSnapshot,
};
use crate::infrastructure::config::{WatchConfig, DEFAULT_WS_URL};
use hypersockets::core::*;
use hypersockets::{
    ExponentialBackoff, HyperSocketError, MessageHandler, MessageRouter, WsMessage,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

// =============================================================================
// Router - Parses WebSocket messages
// =============================================================================

/// Router for parsing CoinCap trade frames
pub struct TradesRouter;

impl TradesRouter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TradesRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MessageRouter for TradesRouter {
    type Message = TradeEvent;
    type RouteKey = TradeRoute;

    async fn parse(&self, message: WsMessage) -> hypersockets::Result<Self::Message> {
        let text = message
            .as_text()
            .ok_or_else(|| HyperSocketError::ParseError("binary frame on trade feed".into()))?;

        serde_json::from_str::<TradeEvent>(text).map_err(|e| {
            HyperSocketError::ParseError(format!("{} in {}", e, truncate(text, 120)))
        })
    }

    fn route_key(&self, _message: &Self::Message) -> Self::RouteKey {
        TradeRoute::Trades
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// =============================================================================
// Handler - Filters trades and maintains the watchlist
// =============================================================================

/// Handler keeping the watchlist of favorited trades
///
/// Favorites are read at arrival time; a trade for an asset favorited
/// later is not recovered.
pub struct TradesHandler {
    favorites: SharedFavorites,
    watchlist: SharedWatchlist,
    publisher: watch::Sender<WatchlistSnapshot>,
    message_count: u64,
    accepted_count: u64,
}

impl TradesHandler {
    pub fn new(
        favorites: SharedFavorites,
        watchlist: SharedWatchlist,
        publisher: watch::Sender<WatchlistSnapshot>,
    ) -> Self {
        Self {
            favorites,
            watchlist,
            publisher,
            message_count: 0,
            accepted_count: 0,
        }
    }

    fn handle_trade(&mut self, trade: TradeEvent) {
        if !trade.is_watched_by(&self.favorites.read()) {
            return;
        }

        let snapshot = {
            let mut watchlist = self.watchlist.write();
            let entry = watchlist.push(trade);
            debug!(
                "[Trades WS] {} {} {}/{} @ {:.2} USD",
                entry.key,
                entry.trade.direction,
                entry.trade.base,
                entry.trade.quote,
                entry.trade.price_usd.value()
            );
            watchlist.snapshot()
        };

        self.accepted_count += 1;
        self.publisher.send_replace(snapshot);
    }
}

impl MessageHandler<TradeEvent> for TradesHandler {
    fn handle(&mut self, message: TradeEvent) -> hypersockets::Result<()> {
        self.message_count += 1;
        self.handle_trade(message);

        // Log periodically to avoid spam
        if self.message_count % 10_000 == 0 {
            debug!(
                "[Trades WS] Seen {} trades, kept {}",
                self.message_count, self.accepted_count
            );
        }

        Ok(())
    }
}

// =============================================================================
// TradeStream - Owns the client and the published watchlist
// =============================================================================

/// Connection settings for [`TradeStream`]
#[derive(Debug, Clone)]
pub struct TradeStreamConfig {
    pub url: String,
    pub reconnect: ExponentialBackoff,
    pub connect_timeout: Duration,
}

impl Default for TradeStreamConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WS_URL)
    }
}

impl TradeStreamConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: ExponentialBackoff::new(
                Duration::from_millis(500),
                Duration::from_secs(30),
                Some(10),
            )
            .with_jitter(0.2),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn from_watch_config(config: &WatchConfig) -> Self {
        Self {
            url: config.api.ws_url.clone(),
            reconnect: config.reconnect_strategy(),
            connect_timeout: config.connect_timeout(),
        }
    }

    pub fn with_reconnect(mut self, reconnect: ExponentialBackoff) -> Self {
        self.reconnect = reconnect;
        self
    }
}

/// Running trade stream
///
/// The handler stays attached for the lifetime of the stream, so every
/// reconnection keeps feeding the same watchlist.
pub struct TradeStream {
    client: WebSocketClient<TradesRouter>,
    watchlist: SharedWatchlist,
    snapshot_rx: watch::Receiver<WatchlistSnapshot>,
}

impl TradeStream {
    /// Build the client and start connecting in the background
    ///
    /// Must be called inside a tokio runtime. Uses a local shutdown flag
    /// because the client clears its flag during `shutdown()`.
    pub async fn spawn(
        config: TradeStreamConfig,
        favorites: SharedFavorites,
    ) -> hypersockets::Result<Self> {
        let watchlist = Watchlist::new().into_shared();
        let (publisher, snapshot_rx) = watch::channel(watchlist.read().snapshot());

        let handler = TradesHandler::new(favorites, Arc::clone(&watchlist), publisher);

        info!("================================================================");
        info!("  STARTING COINCAP TRADE STREAM");
        info!("================================================================");
        info!("  URL: {}", config.url);
        info!("  Watchlist capacity: {}", watchlist.read().capacity());
        info!("================================================================");

        let client = WebSocketClientBuilder::new()
            .url(&config.url)
            .router(TradesRouter::new(), move |routing| {
                routing.handler(TradeRoute::Trades, handler)
            })
            .reconnect_strategy(config.reconnect)
            .connect_timeout(config.connect_timeout)
            .shutdown_flag(Arc::new(AtomicBool::new(true)))
            .build()
            .await?;

        Ok(Self {
            client,
            watchlist,
            snapshot_rx,
        })
    }

    /// Current watchlist, newest first
    pub fn watchlist(&self) -> WatchlistSnapshot {
        self.watchlist.read().snapshot()
    }

    /// Receiver notified on every watchlist change
    pub fn subscribe(&self) -> watch::Receiver<WatchlistSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.client.connection_state()
    }

    pub fn metrics(&self) -> Metrics {
        self.client.metrics()
    }

    pub fn url(&self) -> &str {
        self.client.url()
    }

    pub fn try_recv_event(&self) -> Option<ClientEvent> {
        self.client.try_recv_event()
    }

    /// Close the socket and stop reconnecting
    pub async fn shutdown(self) -> hypersockets::Result<()> {
        info!("[Trades WS] Closing connection");
        let result = self.client.shutdown().await;
        if let Err(e) = &result {
            warn!("[Trades WS] Error during shutdown: {}", e);
        }
        result
    }
}

/// Newest entry of a snapshot, if any
pub fn latest_entry(snapshot: &WatchlistSnapshot) -> Option<&WatchlistEntry> {
    snapshot.first()
}
