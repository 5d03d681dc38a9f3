use super::trade::TradeEvent;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Maximum number of trades kept on the watchlist
pub const WATCHLIST_CAPACITY: usize = 25;

pub type SharedWatchlist = Arc<RwLock<Watchlist>>;

/// Immutable copy of the watchlist, newest first
pub type WatchlistSnapshot = Arc<Vec<WatchlistEntry>>;

#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistEntry {
    /// `"{seq}{base}"`, unique per entry
    pub key: String,
    pub trade: TradeEvent,
    pub received_at: DateTime<Utc>,
}

/// Most-recent-first bounded buffer of trades
///
/// Entries already on the list stay there when favorites change; only
/// arrival-time filtering applies.
#[derive(Debug, Clone)]
pub struct Watchlist {
    entries: VecDeque<WatchlistEntry>,
    capacity: usize,
    next_seq: u64,
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchlist {
    pub fn new() -> Self {
        Self::with_capacity(WATCHLIST_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    pub fn into_shared(self) -> SharedWatchlist {
        Arc::new(RwLock::new(self))
    }

    /// Insert at the front and drop the oldest entry past capacity
    pub fn push(&mut self, trade: TradeEvent) -> &WatchlistEntry {
        self.next_seq += 1;
        let entry = WatchlistEntry {
            key: format!("{}{}", self.next_seq, trade.base),
            trade,
            received_at: Utc::now(),
        };

        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchlistEntry> {
        self.entries.iter()
    }

    pub fn snapshot(&self) -> WatchlistSnapshot {
        Arc::new(self.entries.iter().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of trades ever pushed
    pub fn total_pushed(&self) -> u64 {
        self.next_seq
    }
}
