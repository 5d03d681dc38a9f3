//! Domain Layer
//!
//! Plain data and rules with no I/O: assets, favorites, trades,
//! the bounded watchlist and pagination.

pub mod asset;
pub mod favorites;
pub mod pagination;
pub mod trade;
pub mod watchlist;

pub use asset::{format_price, Asset};
pub use favorites::{Favorites, SharedFavorites};
pub use pagination::{offset_for, Pagination, FIRST_PAGE, PAGE_SIZE};
pub use trade::{TradeEvent, TradeNumber};
pub use watchlist::{
    SharedWatchlist, Watchlist, WatchlistEntry, WatchlistSnapshot, WATCHLIST_CAPACITY,
};
