//! Engine state, configuration and the read-side API.
//!
//! Every mutating operation and every statistics read acquires the single
//! engine-wide mutex for the duration of its critical section, which keeps
//! matching strictly serializable: producers may submit from any thread,
//! and `drain` is the serialization point that imposes a total order over
//! all matched events.

use super::error::EngineError;
use super::events::EventQueue;
use super::latency::LatencyProfile;
use super::statistics::EngineStatistics;
use crate::orderbook::OrderBook;
use crate::orders::{
    BookDepth, MarketData, MarketDataListener, Order, OrderId, Trade, TradeListener,
};
use crate::utils::{current_time_nanos, secs_from_nanos};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use tracing::{debug, info};

/// Acquires a mutex, recovering from poisoning.
///
/// Poisoning only records that some thread panicked while holding the
/// guard; the protected state is still structurally sound, so the engine
/// keeps serving rather than cascading the panic.
pub(super) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Configuration recognized at engine construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Symbols to trade; duplicates are dropped, order preserved.
    pub symbols: Vec<String>,
    /// Seed for the engine-scoped RNG. Runs with the same seed replay the
    /// same latency samples and noise orders.
    pub seed: u64,
    /// Simulation speed factor; `1.0` is real time. Scales the background
    /// driver's drain cadence.
    pub simulation_speed: f64,
}

impl EngineConfig {
    /// Creates a config for `symbols` with the default seed and speed.
    #[must_use]
    pub fn new<S: AsRef<str>>(symbols: &[S]) -> Self {
        Self {
            symbols: symbols.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            seed: 42,
            simulation_speed: 1.0,
        }
    }
}

/// Everything behind the engine mutex.
pub(super) struct EngineState {
    /// Registered symbols, insertion order, deduplicated.
    pub(super) symbols: Vec<String>,
    /// One book per symbol, created at construction and never replaced.
    pub(super) books: HashMap<String, OrderBook>,
    /// Per-agent latency profiles.
    pub(super) latency_profiles: HashMap<String, LatencyProfile>,
    /// Profile applied to agents that never registered.
    pub(super) default_profile: LatencyProfile,
    /// Scheduled order events keyed by effective timestamp.
    pub(super) queue: EventQueue,
    /// Engine-scoped seeded generator; all latency sampling goes through it.
    pub(super) rng: StdRng,
    /// Accumulated counters and per-agent maps.
    pub(super) stats: EngineStatistics,
    /// Trade callbacks, invoked in registration order.
    pub(super) trade_listeners: Vec<TradeListener>,
    /// Market-data callbacks, invoked in registration order.
    pub(super) market_data_listeners: Vec<MarketDataListener>,
    /// Start of the current statistics epoch, nanoseconds.
    pub(super) start_time: u64,
}

/// Multi-symbol matching engine with latency-scheduled submission.
///
/// Cloneable handles are not provided; share the engine across producer
/// threads with an `Arc`. All methods take `&self`.
pub struct MatchingEngine {
    pub(super) state: Arc<Mutex<EngineState>>,
    /// Shutdown flag for the simulation driver, read lock-free by the
    /// driver thread.
    pub(super) running: Arc<AtomicBool>,
    /// Join handle of the driver thread while it runs.
    pub(super) driver: Mutex<Option<JoinHandle<()>>>,
    pub(super) simulation_speed: f64,
    seed: u64,
}

impl MatchingEngine {
    /// Creates an engine trading `symbols` with the default configuration.
    #[must_use]
    pub fn new<S: AsRef<str>>(symbols: &[S]) -> Self {
        Self::from_config(EngineConfig::new(symbols))
    }

    /// Creates an engine from an explicit configuration.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidSimulationSpeed`] unless the speed is
    /// a positive finite number.
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        if !config.simulation_speed.is_finite() || config.simulation_speed <= 0.0 {
            return Err(EngineError::InvalidSimulationSpeed {
                speed: config.simulation_speed,
            });
        }
        Ok(Self::from_config(config))
    }

    fn from_config(config: EngineConfig) -> Self {
        let mut symbols: Vec<String> = Vec::new();
        let mut books: HashMap<String, OrderBook> = HashMap::new();
        for symbol in config.symbols {
            if !books.contains_key(&symbol) {
                books.insert(symbol.clone(), OrderBook::new(symbol.as_str()));
                symbols.push(symbol);
            }
        }
        info!(
            symbols = symbols.len(),
            seed = config.seed,
            speed = config.simulation_speed,
            "matching engine created"
        );

        Self {
            state: Arc::new(Mutex::new(EngineState {
                symbols,
                books,
                latency_profiles: HashMap::new(),
                default_profile: LatencyProfile::default(),
                queue: EventQueue::new(),
                rng: StdRng::seed_from_u64(config.seed),
                stats: EngineStatistics::default(),
                trade_listeners: Vec::new(),
                market_data_listeners: Vec::new(),
                start_time: current_time_nanos(),
            })),
            running: Arc::new(AtomicBool::new(false)),
            driver: Mutex::new(None),
            simulation_speed: config.simulation_speed,
            seed: config.seed,
        }
    }

    /// The RNG seed this engine was constructed with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The configured simulation speed factor.
    #[must_use]
    pub fn simulation_speed(&self) -> f64 {
        self.simulation_speed
    }

    /// Registered symbols in construction order.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        lock(&self.state).symbols.clone()
    }

    /// Records or replaces `agent_id`'s latency profile. Idempotent.
    pub fn register_agent(&self, agent_id: impl Into<String>, profile: LatencyProfile) {
        let agent_id = agent_id.into();
        debug!(%agent_id, ?profile, "agent registered");
        lock(&self.state).latency_profiles.insert(agent_id, profile);
    }

    /// Registers a trade callback; it receives every trade in production
    /// order.
    pub fn add_trade_callback(&self, listener: TradeListener) {
        lock(&self.state).trade_listeners.push(listener);
    }

    /// Registers a market-data callback; it receives one snapshot per
    /// affected symbol after each drain that traded.
    pub fn add_market_data_callback(&self, listener: MarketDataListener) {
        lock(&self.state).market_data_listeners.push(listener);
    }

    /// Top-of-book snapshot for `symbol`, or `None` for unknown symbols.
    pub fn market_data(&self, symbol: &str) -> Option<MarketData> {
        let mut state = lock(&self.state);
        state.books.get_mut(symbol).map(OrderBook::market_data)
    }

    /// Snapshots for every registered symbol, in construction order.
    pub fn all_market_data(&self) -> Vec<MarketData> {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        state
            .symbols
            .iter()
            .filter_map(|symbol| state.books.get_mut(symbol).map(OrderBook::market_data))
            .collect()
    }

    /// Price-aggregated depth for `symbol`, or `None` for unknown symbols.
    pub fn depth(&self, symbol: &str, levels: usize) -> Option<BookDepth> {
        let mut state = lock(&self.state);
        state.books.get_mut(symbol).map(|book| book.depth(levels))
    }

    /// A copy of `symbol`'s trade log, or `None` for unknown symbols.
    pub fn trade_log(&self, symbol: &str) -> Option<Vec<Trade>> {
        let state = lock(&self.state);
        state.books.get(symbol).map(|book| book.trade_log().to_vec())
    }

    /// A copy of an order currently resting in `symbol`'s book, or `None`
    /// when the symbol is unknown or the order is not resting.
    pub fn resting_order(&self, symbol: &str, order_id: &OrderId) -> Option<Order> {
        let state = lock(&self.state);
        state
            .books
            .get(symbol)
            .and_then(|book| book.order(order_id))
            .cloned()
    }

    /// Deep, consistent copy of the accumulated statistics, with
    /// `pending_events` and `avg_trades_per_second` computed at snapshot
    /// time.
    pub fn statistics(&self) -> EngineStatistics {
        let state = lock(&self.state);
        let mut stats = state.stats.clone();
        stats.pending_events = state.queue.len();
        let elapsed = secs_from_nanos(current_time_nanos().saturating_sub(state.start_time));
        stats.avg_trades_per_second = stats.total_trades as f64 / elapsed.max(1.0);
        stats
    }

    /// Clears the event queue, every book and the statistics, and restarts
    /// the statistics clock. Registered symbols, latency profiles and
    /// callbacks are preserved.
    pub fn reset(&self) {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        state.queue.clear();
        for book in state.books.values_mut() {
            book.clear();
        }
        state.stats = EngineStatistics::default();
        state.start_time = current_time_nanos();
        info!("engine reset");
    }
}
