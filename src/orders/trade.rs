//! Executed-trade record and the trade listener type.

use super::order::OrderId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeId(Uuid);

impl TradeId {
    /// Creates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A fill executed between two opposite-sided orders on one symbol.
///
/// The price is always the resting order's price; the timestamp is the
/// later of the two participants' effective timestamps, so a trade never
/// predates either party's simulated arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique trade identifier.
    pub id: TradeId,
    /// Symbol the trade occurred on.
    pub symbol: String,
    /// Executed quantity, always positive.
    pub quantity: u64,
    /// Execution price.
    pub price: f64,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: u64,
    /// Identifier of the buy-side order.
    pub buy_order_id: OrderId,
    /// Identifier of the sell-side order.
    pub sell_order_id: OrderId,
    /// Agent behind the buy-side order.
    pub buyer_agent_id: String,
    /// Agent behind the sell-side order.
    pub seller_agent_id: String,
}

impl Trade {
    /// Price times quantity.
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} x{} @ {} ({} <- {})",
            self.id,
            self.symbol,
            self.quantity,
            self.price,
            self.buyer_agent_id,
            self.seller_agent_id
        )
    }
}

/// Trade listener specification using `Arc` for shared ownership.
///
/// Listeners receive every trade in production order within a drain. They
/// must be non-blocking and must not call back into the engine.
pub type TradeListener = Arc<dyn Fn(&Trade) + Send + Sync>;
