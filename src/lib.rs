//! # Simulated High-Frequency Exchange Matching Core
//!
//! A deterministic matching core for market simulation: one time-priority
//! limit order book per symbol, fed by a latency-scheduled event queue,
//! producing a stream of trades, per-agent accounting and top-of-book
//! market data.
//!
//! ## How it fits together
//!
//! Strategy agents construct [`Order`]s and call
//! [`MatchingEngine::submit`]. The engine samples the submitting agent's
//! [`LatencyProfile`] to stamp an effective timestamp (creation time plus
//! simulated network delay) and schedules the order on an internal
//! min-priority event queue. [`MatchingEngine::drain`] pops every event
//! whose effective timestamp has arrived and routes it to the symbol's
//! [`OrderBook`], which matches under strict price-time priority. Trades
//! update aggregate statistics and fan out to registered callbacks, and
//! each affected symbol publishes a fresh [`MarketData`] snapshot.
//!
//! ## Key properties
//!
//! - **Price-time priority**: at equal price the earliest resting order
//!   matches first, keyed by a monotone insertion sequence so ordering is
//!   robust against coarse clock resolution.
//! - **Latency realism**: per-agent base delay, uniform jitter and a
//!   packet-loss retransmission model reorder submissions the way a real
//!   network would; orders carrying a latency budget are dropped and
//!   counted when they arrive too late.
//! - **Determinism**: all randomness flows through one engine-scoped RNG
//!   seeded from the configuration, so a seed fully determines the latency
//!   stream.
//! - **Serializable matching**: a single engine-wide mutex guards books,
//!   queue, statistics and callbacks; producers submit concurrently and
//!   `drain` imposes the total order.
//!
//! ## Example
//!
//! ```
//! use matchbook_rs::prelude::*;
//! use std::time::Duration;
//!
//! let engine = MatchingEngine::new(&["AAPL"]);
//! engine.register_agent("maker", LatencyProfile::new(0.0005));
//! engine.register_agent("taker", LatencyProfile::new(0.0005));
//!
//! engine.submit(Order::limit("maker", "AAPL", Side::Sell, 100, 150.0)?)?;
//! engine.submit(Order::limit("taker", "AAPL", Side::Buy, 100, 150.0)?)?;
//!
//! // Wait out the simulated network delay, then process arrivals.
//! std::thread::sleep(Duration::from_millis(20));
//! let trades = engine.drain();
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].quantity, 100);
//! assert_eq!(trades[0].price, 150.0);
//! # Ok::<(), matchbook_rs::EngineError>(())
//! ```
//!
//! For continuous simulations, [`MatchingEngine::start`] runs `drain` on a
//! background thread at a ~1 ms cadence scaled by the configured
//! simulation speed; [`MatchingEngine::stop`] joins it.
//!
//! ## Scope
//!
//! The crate models the matching subsystem only. Trading strategies, risk
//! checks, PnL bookkeeping and wire protocols (FIX, ITCH) are external
//! collaborators: producers submit validated orders, consumers observe
//! trades and market data through pull calls or registered callbacks.

pub mod engine;
pub mod orderbook;
pub mod orders;

pub mod prelude;
mod utils;

pub use engine::{
    EngineConfig, EngineError, EngineStatistics, LatencyProfile, MIN_LATENCY_SECS,
    MatchingEngine, NOISE_AGENT_ID,
};
pub use orderbook::{OrderBook, OrderBookSnapshot};
pub use orders::{
    BookDepth, DepthLevel, MarketData, MarketDataListener, Order, OrderError, OrderId,
    OrderStatus, OrderType, Side, Trade, TradeId, TradeListener,
};
pub use utils::current_time_nanos;
