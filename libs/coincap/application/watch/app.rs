//! Main application state and logic for the watcher

use std::sync::Arc;

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::KeyCode;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info, warn};

use super::state::{FetchState, PageResponse, StreamStatus, WatchState};
use crate::domain::{Favorites, SharedFavorites, WatchlistEntry, WatchlistSnapshot, PAGE_SIZE};
use crate::infrastructure::client::assets::AssetsClient;
use crate::infrastructure::client::trades::{TradeStream, TradeStreamConfig};
use crate::infrastructure::config::WatchConfig;

/// User intent decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    ToggleFavorite,
    NextPage,
    PreviousPage,
    Refresh,
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
            KeyCode::Char(' ') | KeyCode::Char('f') => Some(Action::ToggleFavorite),
            KeyCode::Char('n') | KeyCode::Right => Some(Action::NextPage),
            KeyCode::Char('p') | KeyCode::Left => Some(Action::PreviousPage),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        }
    }
}

/// Main application state
pub struct App {
    /// Asset table, pagination and fetch progress
    pub state: WatchState,
    /// Favorited asset keys, shared with the trade handler
    pub favorites: SharedFavorites,
    /// Latest watchlist published by the trade stream
    pub watchlist: WatchlistSnapshot,
    pub stream_status: StreamStatus,
    /// Whether to quit
    pub should_quit: bool,
    /// Status message to show in footer
    pub status_message: Option<String>,
    trade_stream: Option<TradeStream>,
    watchlist_rx: Option<watch::Receiver<WatchlistSnapshot>>,
    assets_client: Arc<AssetsClient>,
    page_tx: Sender<PageResponse>,
    page_rx: Receiver<PageResponse>,
    /// Tokio runtime handle
    runtime: Handle,
}

impl App {
    /// Assemble an app from already built parts. Nothing is fetched yet.
    pub fn new(
        runtime: Handle,
        assets_client: Arc<AssetsClient>,
        favorites: SharedFavorites,
        trade_stream: Option<TradeStream>,
    ) -> Self {
        let (page_tx, page_rx) = unbounded();
        let watchlist_rx = trade_stream.as_ref().map(TradeStream::subscribe);
        let watchlist = trade_stream
            .as_ref()
            .map(TradeStream::watchlist)
            .unwrap_or_default();

        Self {
            state: WatchState::new(),
            favorites,
            watchlist,
            stream_status: StreamStatus::default(),
            should_quit: false,
            status_message: None,
            trade_stream,
            watchlist_rx,
            assets_client,
            page_tx,
            page_rx,
            runtime,
        }
    }

    /// Build the clients from config, start the trade stream and request
    /// the first page
    pub async fn initialize(runtime: Handle, config: &WatchConfig) -> Result<Self> {
        info!("[Watch] Creating assets client for {}", config.api.rest_url);
        let assets_client = Arc::new(AssetsClient::new(
            config.api.rest_url.clone(),
            config.api_key.clone(),
            config.request_timeout(),
        )?);

        let favorites = Favorites::new().into_shared();

        info!("[Watch] Starting trade stream...");
        let stream_config = TradeStreamConfig::from_watch_config(config);
        let (trade_stream, status_message) =
            match TradeStream::spawn(stream_config, Arc::clone(&favorites)).await {
                Ok(stream) => (Some(stream), None),
                Err(e) => {
                    warn!("[Watch] Trade stream unavailable: {}", e);
                    (None, Some(format!("Trade stream unavailable: {}", e)))
                }
            };

        let mut app = Self::new(runtime, assets_client, favorites, trade_stream);
        app.status_message = status_message;
        app.refresh();
        Ok(app)
    }

    /// Fetch the current page again
    pub fn refresh(&mut self) {
        let page = self.state.begin_fetch();
        self.spawn_fetch(page);
    }

    pub fn next_page(&mut self) {
        if let Some(page) = self.state.go_next() {
            self.spawn_fetch(page);
        }
    }

    pub fn previous_page(&mut self) {
        if let Some(page) = self.state.go_previous() {
            self.spawn_fetch(page);
        }
    }

    fn spawn_fetch(&self, page: usize) {
        let client = Arc::clone(&self.assets_client);
        let tx = self.page_tx.clone();

        self.runtime.spawn(async move {
            let result = client
                .fetch_page(PAGE_SIZE, page)
                .await
                .map(|fetched| fetched.assets)
                .map_err(|e| {
                    warn!("[Watch] Failed to fetch page {}: {}", page, e);
                    e.to_string()
                });
            // Receiver gone means the app is shutting down
            let _ = tx.send(PageResponse { page, result });
        });
    }

    /// Apply a fetch result. Returns false when it was stale.
    pub fn apply_page(&mut self, response: PageResponse) -> bool {
        self.state.apply_page(response)
    }

    /// Toggle the favorite flag of the selected asset
    pub fn toggle_selected_favorite(&mut self) {
        let Some(asset) = self.state.selected_asset() else {
            return;
        };

        let is_favorite = self.favorites.write().toggle(&asset.favorite_key());
        self.status_message = Some(if is_favorite {
            format!("Watching trades for {}", asset.name)
        } else {
            format!("Stopped watching {}", asset.name)
        });
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::SelectNext => self.state.select_next(),
            Action::SelectPrevious => self.state.select_previous(),
            Action::ToggleFavorite => self.toggle_selected_favorite(),
            Action::NextPage => self.next_page(),
            Action::PreviousPage => self.previous_page(),
            Action::Refresh => self.refresh(),
        }
    }

    /// Pull in everything that happened since the last frame
    pub fn tick(&mut self) {
        while let Ok(response) = self.page_rx.try_recv() {
            self.apply_page(response);
        }

        if let Some(rx) = self.watchlist_rx.as_mut() {
            if rx.has_changed().unwrap_or(false) {
                self.watchlist = rx.borrow_and_update().clone();
            }
        }

        if let Some(stream) = &self.trade_stream {
            while let Some(event) = stream.try_recv_event() {
                self.stream_status.apply_event(&event);
            }
            self.stream_status.state = stream.connection_state();
        }
    }

    pub fn watchlist_entries(&self) -> &[WatchlistEntry] {
        &self.watchlist
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.favorites.read().is_favorite(key)
    }

    pub fn favorites_count(&self) -> usize {
        self.favorites.read().len()
    }

    pub fn has_stream(&self) -> bool {
        self.trade_stream.is_some()
    }

    /// Error to show in place of the asset table, if any
    pub fn fetch_error(&self) -> Option<&str> {
        match &self.state.fetch_state {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Close the trade stream
    pub async fn shutdown(&mut self) {
        if let Some(stream) = self.trade_stream.take() {
            if let Err(e) = stream.shutdown().await {
                warn!("[Watch] Trade stream shutdown error: {}", e);
            }
        }
        info!("[Watch] Shutdown complete");
    }
}
