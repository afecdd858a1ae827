//! Core order book state: side heaps, the resting-order index and the
//! read paths that lazily evict stale heap entries.

use crate::orders::{BookDepth, DepthLevel, MarketData, Order, OrderId, OrderStatus, Side, Trade};
use crate::utils::current_time_nanos;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::trace;

/// Heap entry for the bid side.
///
/// `BinaryHeap` is a max-heap, so the greatest entry must be the best bid:
/// highest price first, and at equal price the lowest insertion sequence.
/// The sequence counter, not the wall clock, carries time priority; this
/// keeps the ordering stable even when two orders arrive within the clock
/// resolution.
#[derive(Debug, Clone, Copy)]
pub(super) struct BidEntry {
    pub(super) price: f64,
    pub(super) sequence: u64,
    pub(super) order_id: OrderId,
}

impl PartialEq for BidEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BidEntry {}

impl PartialOrd for BidEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BidEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.price
            .total_cmp(&other.price)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Heap entry for the ask side: lowest price first, then lowest sequence.
#[derive(Debug, Clone, Copy)]
pub(super) struct AskEntry {
    pub(super) price: f64,
    pub(super) sequence: u64,
    pub(super) order_id: OrderId,
}

impl PartialEq for AskEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AskEntry {}

impl PartialOrd for AskEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AskEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .price
            .total_cmp(&self.price)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// A time-priority limit order book for a single symbol.
///
/// Resting orders are owned by the id index; the side heaps hold
/// `(price, sequence, order_id)` entries. Cancelling or filling an order
/// removes it from the index but leaves its heap entry behind, so every
/// read path and the match loop skip entries whose id is no longer
/// indexed (lazy eviction). No periodic compaction is performed.
#[derive(Debug)]
pub struct OrderBook {
    /// The symbol this book trades.
    pub(super) symbol: String,
    /// Bid side, best (highest) price at the top.
    pub(super) bids: BinaryHeap<BidEntry>,
    /// Ask side, best (lowest) price at the top.
    pub(super) asks: BinaryHeap<AskEntry>,
    /// Owning index of active resting orders.
    pub(super) orders: HashMap<OrderId, Order>,
    /// Every trade this book has produced since creation or `clear`.
    pub(super) trades: Vec<Trade>,
    /// Price of the most recent trade.
    pub(super) last_trade_price: Option<f64>,
    /// Quantity of the most recent trade.
    pub(super) last_trade_quantity: u64,
    /// Monotone counter assigned to heap entries at insertion.
    pub(super) next_sequence: u64,
}

impl OrderBook {
    /// Creates an empty book for `symbol`.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BinaryHeap::new(),
            asks: BinaryHeap::new(),
            orders: HashMap::new(),
            trades: Vec::new(),
            last_trade_price: None,
            last_trade_quantity: 0,
            next_sequence: 0,
        }
    }

    /// The symbol this book trades.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Best (highest) resting buy price, after evicting stale entries.
    pub fn best_bid(&mut self) -> Option<f64> {
        self.evict_stale_bids();
        self.bids.peek().map(|entry| entry.price)
    }

    /// Best (lowest) resting sell price, after evicting stale entries.
    pub fn best_ask(&mut self) -> Option<f64> {
        self.evict_stale_asks();
        self.asks.peek().map(|entry| entry.price)
    }

    /// Cancels a resting order.
    ///
    /// Returns `true` if the order was active in this book. The heap entry
    /// stays behind and is evicted lazily. Idempotent: a second call for
    /// the same id returns `false`.
    pub fn cancel(&mut self, order_id: &OrderId) -> bool {
        match self.orders.remove(order_id) {
            Some(mut order) => {
                order.status = OrderStatus::Cancelled;
                trace!(%order_id, symbol = %self.symbol, "cancelled resting order");
                true
            }
            None => false,
        }
    }

    /// Builds a top-of-book snapshot.
    ///
    /// Sizes sum the remaining quantities of resting orders at the
    /// respective best price; partially filled orders still count.
    pub fn market_data(&mut self) -> MarketData {
        let best_bid = self.best_bid();
        let best_ask = self.best_ask();
        MarketData {
            symbol: self.symbol.clone(),
            timestamp: current_time_nanos(),
            best_bid,
            best_ask,
            bid_size: best_bid.map_or(0, |price| self.size_at(Side::Buy, price)),
            ask_size: best_ask.map_or(0, |price| self.size_at(Side::Sell, price)),
            last_price: self.last_trade_price,
            last_quantity: self.last_trade_quantity,
        }
    }

    /// Price-aggregated depth, truncated to `levels` per side.
    pub fn depth(&mut self, levels: usize) -> BookDepth {
        self.evict_stale_bids();
        self.evict_stale_asks();
        BookDepth {
            bids: self.aggregate_side(Side::Buy, levels),
            asks: self.aggregate_side(Side::Sell, levels),
            timestamp: current_time_nanos(),
        }
    }

    /// Looks up a resting order by id.
    #[must_use]
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Number of orders currently resting in this book.
    #[must_use]
    pub fn resting_orders(&self) -> usize {
        self.orders.len()
    }

    /// Every trade produced since creation or the last `clear`.
    #[must_use]
    pub fn trade_log(&self) -> &[Trade] {
        &self.trades
    }

    /// Serializable summary of the current book state.
    pub fn snapshot(&mut self) -> OrderBookSnapshot {
        OrderBookSnapshot {
            market_data: self.market_data(),
            resting_orders: self.orders.len(),
            trade_count: self.trades.len(),
        }
    }

    /// Empties heaps, index, trade log and last-trade fields.
    pub(crate) fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
        self.trades.clear();
        self.last_trade_price = None;
        self.last_trade_quantity = 0;
        self.next_sequence = 0;
    }

    pub(super) fn evict_stale_bids(&mut self) {
        while let Some(top) = self.bids.peek() {
            if self.orders.contains_key(&top.order_id) {
                break;
            }
            self.bids.pop();
        }
    }

    pub(super) fn evict_stale_asks(&mut self) {
        while let Some(top) = self.asks.peek() {
            if self.orders.contains_key(&top.order_id) {
                break;
            }
            self.asks.pop();
        }
    }

    /// Sum of remaining quantities resting on `side` at exactly `price`.
    fn size_at(&self, side: Side, price: f64) -> u64 {
        self.orders
            .values()
            .filter(|order| order.side == side && order.price == Some(price))
            .map(Order::remaining_quantity)
            .sum()
    }

    /// Collects `(price, remaining)` pairs for one side best-first and
    /// merges equal prices into levels.
    fn aggregate_side(&self, side: Side, levels: usize) -> Vec<DepthLevel> {
        let mut entries: Vec<(f64, u64)> = self
            .orders
            .values()
            .filter(|order| order.side == side)
            .filter_map(|order| order.price.map(|price| (price, order.remaining_quantity())))
            .collect();
        entries.sort_by(|a, b| match side {
            Side::Buy => b.0.total_cmp(&a.0),
            Side::Sell => a.0.total_cmp(&b.0),
        });

        let mut out: Vec<DepthLevel> = Vec::new();
        for (price, quantity) in entries {
            match out.last_mut() {
                Some(level) if level.price == price => level.quantity += quantity,
                _ => out.push(DepthLevel { price, quantity }),
            }
        }
        out.truncate(levels);
        out
    }
}

/// Serializable point-in-time summary of an [`OrderBook`].
#[derive(Debug, Clone, Serialize)]
pub struct OrderBookSnapshot {
    /// Top-of-book view at snapshot time.
    pub market_data: MarketData,
    /// Number of resting orders.
    pub resting_orders: usize,
    /// Number of trades in the log.
    pub trade_count: usize,
}
