//! Aggregate engine counters and per-agent accounting.

use crate::orders::Trade;
use serde::Serialize;
use std::collections::HashMap;

/// Counters and per-agent maps accumulated by the engine since
/// construction or the last reset.
///
/// `statistics()` returns a deep copy with `pending_events` and
/// `avg_trades_per_second` filled in at snapshot time; the other fields
/// accumulate as events are drained.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStatistics {
    /// Number of trades produced.
    pub total_trades: u64,
    /// Sum of traded quantities.
    pub total_volume: u64,
    /// NEW events drained and routed to a book (latency violations excluded).
    pub orders_processed: u64,
    /// Successful cancellations.
    pub orders_cancelled: u64,
    /// Orders dropped because they were drained past their latency budget.
    pub latency_violations: u64,
    /// Events still waiting in the queue at snapshot time.
    pub pending_events: usize,
    /// `total_trades` over the seconds elapsed since engine start or the
    /// last reset, with the denominator floored at one second.
    pub avg_trades_per_second: f64,
    /// Net signed position per agent and symbol: buys add, sells subtract.
    pub agent_positions: HashMap<String, HashMap<String, i64>>,
    /// Signed notional flow per agent: buyers pay, sellers receive.
    pub agent_cash_flow: HashMap<String, f64>,
}

impl EngineStatistics {
    /// Folds one trade into the counters and both per-agent maps.
    pub(crate) fn record_trade(&mut self, trade: &Trade) {
        self.total_trades += 1;
        self.total_volume += trade.quantity;

        let quantity = trade.quantity as i64;
        *self
            .agent_positions
            .entry(trade.buyer_agent_id.clone())
            .or_default()
            .entry(trade.symbol.clone())
            .or_default() += quantity;
        *self
            .agent_positions
            .entry(trade.seller_agent_id.clone())
            .or_default()
            .entry(trade.symbol.clone())
            .or_default() -= quantity;

        let notional = trade.notional();
        *self
            .agent_cash_flow
            .entry(trade.buyer_agent_id.clone())
            .or_default() -= notional;
        *self
            .agent_cash_flow
            .entry(trade.seller_agent_id.clone())
            .or_default() += notional;
    }

    /// Net position of `agent_id` in `symbol`, zero when unknown.
    #[must_use]
    pub fn position(&self, agent_id: &str, symbol: &str) -> i64 {
        self.agent_positions
            .get(agent_id)
            .and_then(|positions| positions.get(symbol))
            .copied()
            .unwrap_or(0)
    }

    /// Signed notional flow of `agent_id`, zero when unknown.
    #[must_use]
    pub fn cash_flow(&self, agent_id: &str) -> f64 {
        self.agent_cash_flow
            .get(agent_id)
            .copied()
            .unwrap_or(0.0)
    }
}
