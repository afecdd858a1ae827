//! Top-of-book snapshots and aggregated depth views.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Point-in-time top-of-book snapshot for one symbol.
///
/// Sizes aggregate the remaining quantities of active resting orders at
/// the respective best price. `best_bid`/`best_ask` are absent when the
/// side is empty; `last_price` is absent until the first trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Symbol this snapshot describes.
    pub symbol: String,
    /// Snapshot time, nanoseconds since the Unix epoch.
    pub timestamp: u64,
    /// Highest resting buy price, if any.
    pub best_bid: Option<f64>,
    /// Lowest resting sell price, if any.
    pub best_ask: Option<f64>,
    /// Resting quantity at the best bid.
    pub bid_size: u64,
    /// Resting quantity at the best ask.
    pub ask_size: u64,
    /// Price of the most recent trade, if any.
    pub last_price: Option<f64>,
    /// Quantity of the most recent trade, zero before the first trade.
    pub last_quantity: u64,
}

impl MarketData {
    /// Best ask minus best bid, when both sides are present.
    #[must_use]
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Midpoint of the best bid and ask, when both sides are present.
    #[must_use]
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }
}

/// One aggregated price level in a depth view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Price of the level.
    pub price: f64,
    /// Sum of remaining quantities of active resting orders at this price.
    pub quantity: u64,
}

/// Price-aggregated order book depth.
///
/// Bids are ordered best-first (descending price), asks best-first
/// (ascending price); each side is truncated to the requested number of
/// levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDepth {
    /// Bid levels, descending by price.
    pub bids: Vec<DepthLevel>,
    /// Ask levels, ascending by price.
    pub asks: Vec<DepthLevel>,
    /// Snapshot time, nanoseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Market-data listener specification using `Arc` for shared ownership.
///
/// Invoked once per affected symbol after every drain that produced
/// trades on that symbol. Must be non-blocking and must not call back
/// into the engine.
pub type MarketDataListener = Arc<dyn Fn(&MarketData) + Send + Sync>;
