//! Trade stream routing types

/// Route key for trade stream messages
///
/// The feed only carries trades, so everything lands on one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeRoute {
    Trades,
}
