//! Trade Tail - headless watchlist follower
//!
//! Streams CoinCap trades for the assets named on the command line and
//! logs every new watchlist entry.
//!
//! Usage: `trade-tail bitcoin ethereum` or `trade-tail bitcoin,ethereum`

use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use coincap_watch::bin_common::{
    load_config_from_env, parse_args, parse_favorites, BinaryRunner, RunConfig,
};
use coincap_watch::coincap::domain::{Favorites, WatchlistEntry, WatchlistSnapshot};
use coincap_watch::coincap::{
    init_tracing_with_level, ShutdownManager, TradeStream, TradeStreamConfig, WatchConfig,
};
use coincap_watch::hypersockets::ClientEvent;

/// Upper bound on one wait for a snapshot, so client events are drained regularly
const SNAPSHOT_WAIT: Duration = Duration::from_millis(100);

struct TradeTail {
    run_config: RunConfig,
    watch_config: WatchConfig,
    favorites: Vec<String>,
    stream: Option<TradeStream>,
    snapshots: Option<watch::Receiver<WatchlistSnapshot>>,
    last_key: Option<String>,
    logged: u64,
}

impl TradeTail {
    fn new(watch_config: WatchConfig, favorites: Vec<String>) -> Self {
        Self {
            run_config: RunConfig::new("Trade Tail"),
            watch_config,
            favorites,
            stream: None,
            snapshots: None,
            last_key: None,
            logged: 0,
        }
    }

    /// Log entries newer than `last_key`, oldest first
    fn log_new_entries(&mut self, entries: &[WatchlistEntry]) {
        let fresh: Vec<&WatchlistEntry> = entries
            .iter()
            .take_while(|e| Some(&e.key) != self.last_key.as_ref())
            .collect();

        for entry in fresh.iter().rev() {
            let trade = &entry.trade;
            info!(
                "[Trade] {} {} {} {}/{} price={} size={} usd={:.2}",
                entry.received_at.format("%H:%M:%S%.3f"),
                trade.exchange,
                trade.direction,
                trade.base,
                trade.quote,
                trade.price,
                trade.volume,
                trade.price_usd.value()
            );
        }
        self.logged += fresh.len() as u64;

        if let Some(newest) = entries.first() {
            self.last_key = Some(newest.key.clone());
        }
    }

    /// Log pending client events; false once the stream has given up
    fn drain_events(stream: &TradeStream) -> bool {
        let mut alive = true;
        while let Some(event) = stream.try_recv_event() {
            match event {
                ClientEvent::Connected => info!("[Trades WS] Connected to {}", stream.url()),
                ClientEvent::Disconnected => warn!("[Trades WS] Disconnected"),
                ClientEvent::Reconnecting(attempt) => {
                    warn!("[Trades WS] Reconnecting (attempt {})", attempt)
                }
                ClientEvent::Error(err) => warn!("[Trades WS] Error: {}", err),
                ClientEvent::GaveUp(attempts) => {
                    warn!("[Trades WS] Gave up after {} attempts", attempts);
                    alive = false;
                }
            }
        }
        alive
    }
}

impl BinaryRunner for TradeTail {
    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    async fn start(&mut self) -> Result<()> {
        let favorites = Favorites::from_keys(&self.favorites);
        info!("Watching: {}", favorites.sorted_keys().join(", "));

        let stream = TradeStream::spawn(
            TradeStreamConfig::from_watch_config(&self.watch_config),
            favorites.into_shared(),
        )
        .await?;

        self.snapshots = Some(stream.subscribe());
        self.stream = Some(stream);
        Ok(())
    }

    async fn step(&mut self) -> Result<bool> {
        let Some(snapshots) = self.snapshots.as_mut() else {
            return Ok(false);
        };

        let changed = match tokio::time::timeout(SNAPSHOT_WAIT, snapshots.changed()).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) => {
                warn!("Trade stream closed");
                return Ok(false);
            }
            Err(_) => false,
        };

        if changed {
            let snapshot = snapshots.borrow_and_update().clone();
            self.log_new_entries(&snapshot);
        }

        Ok(self.stream.as_ref().map_or(false, Self::drain_events))
    }

    fn status(&self) -> String {
        match &self.stream {
            Some(stream) => {
                let metrics = stream.metrics();
                format!(
                    "state={} received={} parse_errors={} reconnects={} watchlist={} logged={}",
                    metrics.connection_state,
                    metrics.messages_received,
                    metrics.parse_errors,
                    metrics.reconnect_count,
                    stream.watchlist().len(),
                    self.logged
                )
            }
            None => "not started".to_string(),
        }
    }

    async fn stop(&mut self) -> Result<Option<String>> {
        let summary = self.status();
        self.snapshots = None;
        if let Some(stream) = self.stream.take() {
            stream.shutdown().await?;
        }
        Ok(Some(summary))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = WatchConfig::load_or_default(load_config_from_env())?;
    init_tracing_with_level(&config.log_level);

    let favorites = parse_favorites(&parse_args());
    if favorites.is_empty() {
        bail!("usage: trade-tail <asset> [asset...]  (e.g. trade-tail bitcoin ethereum)");
    }

    config.log();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    TradeTail::new(config, favorites).execute(&shutdown).await
}
