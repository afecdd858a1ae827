//! Prelude module that re-exports the commonly used types.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use matchbook_rs::prelude::*;
//! ```

// Engine types
pub use crate::engine::{
    EngineConfig, EngineError, EngineStatistics, LatencyProfile, MatchingEngine,
};

// Order book types
pub use crate::orderbook::{OrderBook, OrderBookSnapshot};

// Order, trade and market-data value types
pub use crate::orders::{
    BookDepth, DepthLevel, MarketData, MarketDataListener, Order, OrderError, OrderId,
    OrderStatus, OrderType, Side, Trade, TradeId, TradeListener,
};

// Utility functions
pub use crate::utils::current_time_nanos;
