//! State management for the watcher

use crate::domain::{Asset, Pagination, FIRST_PAGE, PAGE_SIZE};
use hypersockets::{ClientEvent, ConnectionState};
use tracing::debug;

/// Progress of the asset request for the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Failed(String),
}

/// Result of one page fetch, tagged with the page it was issued for
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub page: usize,
    pub result: Result<Vec<Asset>, String>,
}

/// Asset table state: current page, selection and request tracking
///
/// Only the response for the most recently requested page is applied;
/// anything else that arrives is stale and dropped.
#[derive(Debug, Clone)]
pub struct WatchState {
    pub assets: Vec<Asset>,
    pub pagination: Pagination,
    pub selected_index: usize,
    pub fetch_state: FetchState,
    requested_page: usize,
}

impl Default for WatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchState {
    pub fn new() -> Self {
        Self {
            assets: Vec::new(),
            pagination: Pagination::new(PAGE_SIZE),
            selected_index: 0,
            fetch_state: FetchState::Idle,
            requested_page: FIRST_PAGE,
        }
    }

    pub fn requested_page(&self) -> usize {
        self.requested_page
    }

    pub fn is_loading(&self) -> bool {
        self.fetch_state == FetchState::Loading
    }

    /// Mark the current page as in flight and return it
    pub fn begin_fetch(&mut self) -> usize {
        self.requested_page = self.pagination.page();
        self.fetch_state = FetchState::Loading;
        self.requested_page
    }

    /// Advance to the next page if enabled, returning the page to fetch
    pub fn go_next(&mut self) -> Option<usize> {
        self.pagination.next()?;
        Some(self.begin_fetch())
    }

    /// Go back one page if enabled, returning the page to fetch
    pub fn go_previous(&mut self) -> Option<usize> {
        self.pagination.previous()?;
        Some(self.begin_fetch())
    }

    /// Apply a fetch result. Returns false when the response was stale.
    pub fn apply_page(&mut self, response: PageResponse) -> bool {
        if response.page != self.requested_page {
            debug!(
                "[Watch] Discarding stale response for page {} (current {})",
                response.page, self.requested_page
            );
            return false;
        }

        match response.result {
            Ok(assets) => {
                self.pagination.record_page_len(assets.len());
                self.assets = assets;
                self.fetch_state = FetchState::Idle;
            }
            Err(message) => {
                self.pagination.record_page_len(0);
                self.assets.clear();
                self.fetch_state = FetchState::Failed(message);
            }
        }
        self.selected_index = 0;
        true
    }

    pub fn selected_asset(&self) -> Option<&Asset> {
        self.assets.get(self.selected_index)
    }

    /// Move selection down, wrapping to the top
    pub fn select_next(&mut self) {
        if !self.assets.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.assets.len();
        }
    }

    /// Move selection up, wrapping to the bottom
    pub fn select_previous(&mut self) {
        if !self.assets.is_empty() {
            self.selected_index = if self.selected_index == 0 {
                self.assets.len() - 1
            } else {
                self.selected_index - 1
            };
        }
    }
}

/// What the UI knows about the trade stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatus {
    pub state: ConnectionState,
    pub reconnect_attempt: Option<usize>,
    pub gave_up: bool,
    pub last_error: Option<String>,
}

impl Default for StreamStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            reconnect_attempt: None,
            gave_up: false,
            last_error: None,
        }
    }
}

impl StreamStatus {
    pub fn apply_event(&mut self, event: &ClientEvent) {
        match event {
            ClientEvent::Connected => {
                self.reconnect_attempt = None;
                self.gave_up = false;
                self.last_error = None;
            }
            ClientEvent::Disconnected => {}
            ClientEvent::Reconnecting(attempt) => self.reconnect_attempt = Some(*attempt),
            ClientEvent::Error(err) => self.last_error = Some(err.clone()),
            ClientEvent::GaveUp(_) => {
                self.reconnect_attempt = None;
                self.gave_up = true;
            }
        }
    }

    pub fn label(&self) -> String {
        if self.gave_up {
            return "offline (gave up)".to_string();
        }
        match (self.state, self.reconnect_attempt) {
            (ConnectionState::Reconnecting, Some(attempt)) => {
                format!("reconnecting (attempt {})", attempt)
            }
            (state, _) => state.label().to_string(),
        }
    }
}
