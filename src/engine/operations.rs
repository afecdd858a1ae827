//! Mutating engine operations: submission, cancellation, draining and
//! noise injection.

use super::core::{EngineState, MatchingEngine, lock};
use super::error::EngineError;
use super::events::EventKind;
use super::latency::MIN_LATENCY_SECS;
use crate::orders::{MarketData, Order, OrderId, Side, Trade};
use crate::utils::{current_time_nanos, nanos_from_secs};
use rand::Rng;
use std::sync::Mutex;
use tracing::{debug, trace};

/// Reserved agent tag used for synthetic noise orders.
pub const NOISE_AGENT_ID: &str = "noise";

impl MatchingEngine {
    /// Schedules an order for matching.
    ///
    /// Under the engine lock this samples the submitter's latency profile
    /// (the default profile when the agent never registered), stamps the
    /// order's delay and pushes a NEW event. The order will not match until
    /// a drain observes its effective timestamp; this method never matches.
    ///
    /// # Errors
    /// [`EngineError::InvalidOrder`] when validation fails and
    /// [`EngineError::UnknownSymbol`] when the engine does not trade the
    /// order's symbol. In both cases nothing is enqueued.
    pub fn submit(&self, mut order: Order) -> Result<OrderId, EngineError> {
        order.validate()?;
        let mut state = lock(&self.state);
        if !state.books.contains_key(&order.symbol) {
            return Err(EngineError::UnknownSymbol {
                symbol: order.symbol.clone(),
            });
        }

        let profile = state
            .latency_profiles
            .get(&order.agent_id)
            .copied()
            .unwrap_or(state.default_profile);
        let delay = profile.sample(&mut state.rng);
        order.latency_delay = nanos_from_secs(delay);

        let order_id = order.id;
        trace!(
            %order_id,
            agent_id = %order.agent_id,
            symbol = %order.symbol,
            delay_secs = delay,
            "order scheduled"
        );
        state.queue.push(EventKind::New, order);
        Ok(order_id)
    }

    /// Cancels a resting order on whichever book holds it.
    ///
    /// A round-trip latency is sampled from the caller's profile for
    /// bookkeeping, but the cancel itself is applied immediately; it cannot
    /// recall an event that has not been drained yet. Returns `false` when
    /// no book knows the id.
    pub fn cancel(&self, agent_id: &str, order_id: &OrderId) -> bool {
        let mut state = lock(&self.state);
        let profile = state
            .latency_profiles
            .get(agent_id)
            .copied()
            .unwrap_or(state.default_profile);
        // Advisory only: the sampled RTT models what the agent would see on
        // the wire, not when the book applies the cancel.
        let rtt = profile.sample(&mut state.rng);
        trace!(agent_id, %order_id, rtt_secs = rtt, "cancel requested");

        let state = &mut *state;
        for book in state.books.values_mut() {
            if book.cancel(order_id) {
                state.stats.orders_cancelled += 1;
                return true;
            }
        }
        false
    }

    /// Pops and processes every event whose effective timestamp has
    /// arrived, returning the trades produced in execution order.
    ///
    /// NEW events past their latency budget are counted as violations and
    /// dropped without touching a book. Trades update the aggregate
    /// statistics and per-agent accounting. Callbacks are dispatched after
    /// the engine lock is released: first every trade listener in
    /// production order, then one market-data snapshot per symbol that
    /// traded.
    pub fn drain(&self) -> Vec<Trade> {
        drain_state(&self.state)
    }

    /// Submits a small synthetic MARKET order of random side under the
    /// reserved [`NOISE_AGENT_ID`] tag with minimal latency.
    ///
    /// Returns `None` without submitting when the symbol is unknown or the
    /// book lacks a two-sided top. Quantity is uniform in
    /// `1..=ceil(10 * intensity)`.
    pub fn inject_noise(&self, symbol: &str, intensity: f64) -> Option<OrderId> {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        let book = state.books.get_mut(symbol)?;
        if book.best_bid().is_none() || book.best_ask().is_none() {
            return None;
        }

        let side = if state.rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };
        let max_quantity = ((intensity.max(0.0) * 10.0).ceil() as u64).max(1);
        let quantity = state.rng.gen_range(1..=max_quantity);
        let Ok(mut order) = Order::market(NOISE_AGENT_ID, symbol, side, quantity) else {
            return None;
        };
        order.latency_delay = nanos_from_secs(MIN_LATENCY_SECS);

        let order_id = order.id;
        debug!(symbol, %side, quantity, "noise order injected");
        state.queue.push(EventKind::New, order);
        Some(order_id)
    }
}

/// Drain body shared by [`MatchingEngine::drain`] and the background
/// driver thread.
pub(super) fn drain_state(state: &Mutex<EngineState>) -> Vec<Trade> {
    let mut guard = lock(state);
    let state = &mut *guard;
    let now = current_time_nanos();

    let mut trades_out: Vec<Trade> = Vec::new();
    let mut touched: Vec<String> = Vec::new();

    while let Some(event) = state.queue.pop_ready(now) {
        match event.kind {
            EventKind::New => {
                let order = event.order;
                if let Some(budget) = order.max_latency {
                    if now.saturating_sub(order.timestamp) > budget {
                        state.stats.latency_violations += 1;
                        debug!(
                            order_id = %order.id,
                            agent_id = %order.agent_id,
                            "latency budget exceeded, order dropped"
                        );
                        continue;
                    }
                }
                // Symbols are validated at submission; an unknown symbol here
                // would mean the book map changed, which it never does.
                let Some(book) = state.books.get_mut(&order.symbol) else {
                    continue;
                };
                state.stats.orders_processed += 1;
                let symbol = order.symbol.clone();
                let trades = book.add(order);
                if !trades.is_empty() && !touched.contains(&symbol) {
                    touched.push(symbol);
                }
                for trade in &trades {
                    state.stats.record_trade(trade);
                }
                trades_out.extend(trades);
            }
            EventKind::Cancel => {
                if let Some(book) = state.books.get_mut(&event.order.symbol) {
                    if book.cancel(&event.order.id) {
                        state.stats.orders_cancelled += 1;
                    }
                }
            }
        }
    }

    // Copy out everything the callbacks need, then dispatch with the lock
    // released so a slow consumer cannot stall producers.
    let snapshots: Vec<MarketData> = touched
        .iter()
        .filter_map(|symbol| {
            state
                .books
                .get_mut(symbol)
                .map(crate::orderbook::OrderBook::market_data)
        })
        .collect();
    let trade_listeners = state.trade_listeners.clone();
    let market_data_listeners = state.market_data_listeners.clone();
    drop(guard);

    for trade in &trades_out {
        for listener in &trade_listeners {
            listener(trade);
        }
    }
    for snapshot in &snapshots {
        for listener in &market_data_listeners {
            listener(snapshot);
        }
    }

    trades_out
}
