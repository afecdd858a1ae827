//! The order value type and its side, type and status enums.

use super::error::OrderError;
use crate::utils::current_time_nanos;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for an order.
///
/// Engine-assigned UUIDv4, unique within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which side of the book an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid side.
    Buy,
    /// Ask side.
    Sell,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// The supported order types: day-limit and immediate-market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Rests in the book at its limit price until matched or cancelled.
    Limit,
    /// Executes immediately against resting liquidity; any residual is dropped.
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
        }
    }
}

/// Lifecycle state of an order.
///
/// Progresses `Pending -> PartiallyFilled -> Filled`, or to `Cancelled`
/// from either non-terminal state. `Filled` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// No fills yet.
    Pending,
    /// Some quantity filled, some still working.
    PartiallyFilled,
    /// Fully executed.
    Filled,
    /// Cancelled before completion.
    Cancelled,
}

impl OrderStatus {
    /// Whether this status is terminal (the order can never re-enter a book).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A limit or market order with its latency stamps and fill state.
///
/// Orders are created through [`Order::limit`] and [`Order::market`], which
/// validate the price/quantity invariants. The engine owns an order from
/// submission until it reaches a terminal state; while resting it lives in
/// its book's id index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Tag of the submitting agent.
    pub agent_id: String,
    /// Symbol this order trades.
    pub symbol: String,
    /// Buy or sell.
    pub side: Side,
    /// Limit or market.
    pub order_type: OrderType,
    /// Original quantity, always positive.
    pub quantity: u64,
    /// Limit price; present iff `order_type` is `Limit`.
    pub price: Option<f64>,
    /// Quantity filled so far, `0 ..= quantity`.
    pub filled_quantity: u64,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// Creation time, nanoseconds since the Unix epoch.
    pub timestamp: u64,
    /// Sampled network delay in nanoseconds; assigned at submission.
    pub latency_delay: u64,
    /// Optional latency budget in nanoseconds. An order drained later than
    /// `timestamp + max_latency` is dropped and counted as a violation.
    pub max_latency: Option<u64>,
}

impl Order {
    /// Creates a validated limit order.
    ///
    /// # Errors
    /// Returns [`OrderError::ZeroQuantity`] for a zero quantity and
    /// [`OrderError::InvalidLimitPrice`] for a non-finite or non-positive
    /// price.
    pub fn limit(
        agent_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        quantity: u64,
        price: f64,
    ) -> Result<Self, OrderError> {
        let order = Self {
            id: OrderId::new(),
            agent_id: agent_id.into(),
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            filled_quantity: 0,
            status: OrderStatus::Pending,
            timestamp: current_time_nanos(),
            latency_delay: 0,
            max_latency: None,
        };
        order.validate()?;
        Ok(order)
    }

    /// Creates a validated market order.
    ///
    /// # Errors
    /// Returns [`OrderError::ZeroQuantity`] for a zero quantity.
    pub fn market(
        agent_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        quantity: u64,
    ) -> Result<Self, OrderError> {
        let order = Self {
            id: OrderId::new(),
            agent_id: agent_id.into(),
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            filled_quantity: 0,
            status: OrderStatus::Pending,
            timestamp: current_time_nanos(),
            latency_delay: 0,
            max_latency: None,
        };
        order.validate()?;
        Ok(order)
    }

    /// Attaches a latency budget to this order.
    #[must_use]
    pub fn with_max_latency(mut self, budget: Duration) -> Self {
        self.max_latency = Some(budget.as_nanos() as u64);
        self
    }

    /// Re-checks the construction invariants.
    ///
    /// Fields are public, so the engine validates again at submission.
    ///
    /// # Errors
    /// Same failure modes as the constructors.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.quantity == 0 {
            return Err(OrderError::ZeroQuantity);
        }
        match (self.order_type, self.price) {
            (OrderType::Limit, None) => Err(OrderError::MissingLimitPrice),
            (OrderType::Limit, Some(price)) if !price.is_finite() || price <= 0.0 => {
                Err(OrderError::InvalidLimitPrice { price })
            }
            (OrderType::Market, Some(price)) => Err(OrderError::UnexpectedPrice { price }),
            _ => Ok(()),
        }
    }

    /// Quantity still unfilled.
    #[must_use]
    pub fn remaining_quantity(&self) -> u64 {
        self.quantity - self.filled_quantity
    }

    /// Whether this is a buy order.
    #[must_use]
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    /// Whether this is a sell order.
    #[must_use]
    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }

    /// Whether the order is still working (pending or partially filled).
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Pending | OrderStatus::PartiallyFilled
        )
    }

    /// The timestamp under which the event queue dispatches this order:
    /// creation time plus the sampled latency delay.
    #[must_use]
    pub fn effective_timestamp(&self) -> u64 {
        self.timestamp.saturating_add(self.latency_delay)
    }

    /// Records a fill and advances the status machine.
    ///
    /// A cancelled order's status is never overwritten.
    pub(crate) fn apply_fill(&mut self, quantity: u64) {
        self.filled_quantity = (self.filled_quantity + quantity).min(self.quantity);
        if self.status == OrderStatus::Cancelled {
            return;
        }
        if self.filled_quantity == self.quantity {
            self.status = OrderStatus::Filled;
        } else if self.filled_quantity > 0 {
            self.status = OrderStatus::PartiallyFilled;
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} x{}",
            self.id, self.agent_id, self.side, self.order_type, self.quantity
        )?;
        if let Some(price) = self.price {
            write!(f, " @ {price}")?;
        }
        Ok(())
    }
}
