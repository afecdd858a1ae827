//! Property tests over random order flow: accounting invariants, an
//! uncrossed book and drain idempotence must hold for every sequence.

use matchbook_rs::prelude::*;
use proptest::prelude::*;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

const AGENTS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

#[derive(Debug, Clone)]
struct OrderSpec {
    agent: usize,
    side: Side,
    market: bool,
    quantity: u64,
    ticks: u8,
}

impl OrderSpec {
    fn build(&self) -> Order {
        let agent = AGENTS[self.agent];
        if self.market {
            Order::market(agent, "AAPL", self.side, self.quantity).unwrap()
        } else {
            let price = 95.0 + f64::from(self.ticks) * 0.5;
            Order::limit(agent, "AAPL", self.side, self.quantity, price).unwrap()
        }
    }
}

fn arb_order_spec() -> impl Strategy<Value = OrderSpec> {
    (
        0..AGENTS.len(),
        any::<bool>(),
        prop::bool::weighted(0.2),
        1..200u64,
        0..21u8,
    )
        .prop_map(|(agent, is_buy, market, quantity, ticks)| OrderSpec {
            agent,
            side: if is_buy { Side::Buy } else { Side::Sell },
            market,
            quantity,
            ticks,
        })
}

/// Submits every spec with a floor-latency profile and drains once all
/// effective timestamps have certainly passed.
fn run_flow(specs: &[OrderSpec]) -> (MatchingEngine, Vec<Trade>) {
    let engine = MatchingEngine::new(&["AAPL"]);
    for agent in AGENTS {
        engine.register_agent(agent, LatencyProfile::new(0.0));
    }
    for spec in specs {
        engine.submit(spec.build()).unwrap();
    }
    thread::sleep(Duration::from_millis(5));
    let trades = engine.drain();
    (engine, trades)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_volume_and_counts_add_up(specs in prop::collection::vec(arb_order_spec(), 1..40)) {
        let (engine, trades) = run_flow(&specs);
        let stats = engine.statistics();

        prop_assert_eq!(stats.orders_processed, specs.len() as u64);
        prop_assert_eq!(stats.pending_events, 0);
        prop_assert_eq!(stats.total_trades, trades.len() as u64);
        prop_assert_eq!(
            stats.total_volume,
            trades.iter().map(|t| t.quantity).sum::<u64>()
        );
    }

    #[test]
    fn prop_book_never_crosses(specs in prop::collection::vec(arb_order_spec(), 1..40)) {
        let (engine, _trades) = run_flow(&specs);
        let market_data = engine.market_data("AAPL").unwrap();

        if let (Some(bid), Some(ask)) = (market_data.best_bid, market_data.best_ask) {
            prop_assert!(bid < ask, "book crossed: bid {bid} >= ask {ask}");
        }
    }

    #[test]
    fn prop_positions_match_trade_stream(specs in prop::collection::vec(arb_order_spec(), 1..40)) {
        let (engine, trades) = run_flow(&specs);
        let stats = engine.statistics();

        let mut positions: HashMap<&str, i64> = HashMap::new();
        let mut cash: HashMap<&str, f64> = HashMap::new();
        for trade in &trades {
            let quantity = trade.quantity as i64;
            *positions.entry(trade.buyer_agent_id.as_str()).or_default() += quantity;
            *positions.entry(trade.seller_agent_id.as_str()).or_default() -= quantity;
            *cash.entry(trade.buyer_agent_id.as_str()).or_default() -= trade.notional();
            *cash.entry(trade.seller_agent_id.as_str()).or_default() += trade.notional();
        }

        for agent in AGENTS {
            prop_assert_eq!(
                stats.position(agent, "AAPL"),
                positions.get(agent).copied().unwrap_or(0)
            );
            let expected = cash.get(agent).copied().unwrap_or(0.0);
            prop_assert!((stats.cash_flow(agent) - expected).abs() < 1e-6);
        }
        // Trading moves value between agents, never creates it.
        let total: f64 = AGENTS.iter().map(|agent| stats.cash_flow(agent)).sum();
        prop_assert!(total.abs() < 1e-6);
    }

    #[test]
    fn prop_depth_agrees_with_top_of_book(specs in prop::collection::vec(arb_order_spec(), 1..40)) {
        let (engine, _trades) = run_flow(&specs);
        let market_data = engine.market_data("AAPL").unwrap();
        let depth = engine.depth("AAPL", 32).unwrap();

        match (market_data.best_bid, depth.bids.first()) {
            (Some(bid), Some(level)) => {
                prop_assert_eq!(level.price, bid);
                prop_assert_eq!(level.quantity, market_data.bid_size);
            }
            (None, None) => {}
            (bid, level) => prop_assert!(false, "bid mismatch: {bid:?} vs {level:?}"),
        }
        match (market_data.best_ask, depth.asks.first()) {
            (Some(ask), Some(level)) => {
                prop_assert_eq!(level.price, ask);
                prop_assert_eq!(level.quantity, market_data.ask_size);
            }
            (None, None) => {}
            (ask, level) => prop_assert!(false, "ask mismatch: {ask:?} vs {level:?}"),
        }
    }

    #[test]
    fn prop_drain_is_idempotent(specs in prop::collection::vec(arb_order_spec(), 1..20)) {
        let (engine, _trades) = run_flow(&specs);
        let before = engine.statistics();
        let again = engine.drain();

        prop_assert!(again.is_empty());
        let after = engine.statistics();
        prop_assert_eq!(before.total_trades, after.total_trades);
        prop_assert_eq!(before.total_volume, after.total_volume);
        prop_assert_eq!(before.orders_processed, after.orders_processed);
    }
}
