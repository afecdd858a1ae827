//! End-to-end matching scenarios: crossing, partial fills, priority,
//! latency ordering and depth aggregation.

use matchbook_rs::prelude::*;
use std::thread;
use std::time::Duration;

const SETTLE: Duration = Duration::from_millis(20);

fn engine_with_agents(agents: &[&str]) -> MatchingEngine {
    let engine = MatchingEngine::new(&["AAPL"]);
    for agent in agents {
        engine.register_agent(*agent, LatencyProfile::new(0.001));
    }
    engine
}

#[test]
fn test_crossing_match() {
    let engine = engine_with_agents(&["a1", "a2"]);
    engine
        .submit(Order::limit("a1", "AAPL", Side::Sell, 100, 150.0).unwrap())
        .unwrap();
    engine
        .submit(Order::limit("a2", "AAPL", Side::Buy, 100, 150.0).unwrap())
        .unwrap();
    thread::sleep(SETTLE);
    let trades = engine.drain();

    assert_eq!(trades.len(), 1);
    let trade = &trades[0];
    assert_eq!(trade.quantity, 100);
    assert_eq!(trade.price, 150.0);
    assert_eq!(trade.buyer_agent_id, "a2");
    assert_eq!(trade.seller_agent_id, "a1");

    let stats = engine.statistics();
    assert_eq!(stats.total_trades, 1);
    assert_eq!(stats.total_volume, 100);
    assert_eq!(stats.orders_processed, 2);
}

#[test]
fn test_partial_fill() {
    let engine = engine_with_agents(&["a1", "a2"]);
    engine
        .submit(Order::limit("a1", "AAPL", Side::Sell, 200, 150.0).unwrap())
        .unwrap();
    engine
        .submit(Order::limit("a2", "AAPL", Side::Buy, 50, 150.0).unwrap())
        .unwrap();
    thread::sleep(SETTLE);
    let trades = engine.drain();

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].quantity, 50);

    let market_data = engine.market_data("AAPL").unwrap();
    assert_eq!(market_data.best_ask, Some(150.0));
    assert_eq!(market_data.ask_size, 150);
}

#[test]
fn test_price_priority() {
    let engine = engine_with_agents(&["s1", "s2", "b"]);
    engine
        .submit(Order::limit("s1", "AAPL", Side::Sell, 100, 151.0).unwrap())
        .unwrap();
    engine
        .submit(Order::limit("s2", "AAPL", Side::Sell, 100, 150.0).unwrap())
        .unwrap();
    engine
        .submit(Order::limit("b", "AAPL", Side::Buy, 100, 152.0).unwrap())
        .unwrap();
    thread::sleep(SETTLE);
    let trades = engine.drain();

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price, 150.0);
    assert_eq!(trades[0].seller_agent_id, "s2");

    // The 151.00 order is still resting.
    let market_data = engine.market_data("AAPL").unwrap();
    assert_eq!(market_data.best_ask, Some(151.0));
    assert_eq!(market_data.ask_size, 100);
}

#[test]
fn test_market_order_against_empty_book() {
    let engine = engine_with_agents(&["b"]);
    engine
        .submit(Order::market("b", "AAPL", Side::Buy, 50).unwrap())
        .unwrap();
    thread::sleep(SETTLE);
    let trades = engine.drain();

    assert!(trades.is_empty());
    let market_data = engine.market_data("AAPL").unwrap();
    assert_eq!(market_data.best_bid, None);
    assert_eq!(market_data.best_ask, None);

    let stats = engine.statistics();
    assert_eq!(stats.total_trades, 0);
    assert_eq!(stats.total_volume, 0);
    assert_eq!(stats.orders_processed, 1);
}

#[test]
fn test_latency_ordering() {
    let engine = MatchingEngine::new(&["AAPL"]);
    engine.register_agent("slow", LatencyProfile::new(0.005));
    engine.register_agent("fast", LatencyProfile::new(0.0001));

    let sell = Order::limit("slow", "AAPL", Side::Sell, 100, 150.0).unwrap();
    let sell_created = sell.timestamp;
    engine.submit(sell).unwrap();
    let buy = Order::limit("fast", "AAPL", Side::Buy, 100, 150.0).unwrap();
    engine.submit(buy).unwrap();

    thread::sleep(SETTLE);
    let trades = engine.drain();

    // The buy arrives first and rests; the late sell is the aggressor, so
    // the trade happens at the resting buy's price and not before the
    // sell's effective arrival.
    assert_eq!(trades.len(), 1);
    let trade = &trades[0];
    assert_eq!(trade.price, 150.0);
    assert_eq!(trade.buyer_agent_id, "fast");
    assert_eq!(trade.seller_agent_id, "slow");
    assert!(trade.timestamp >= sell_created + 4_000_000);
}

#[test]
fn test_depth_aggregation() {
    let engine = engine_with_agents(&["a"]);
    engine
        .submit(Order::limit("a", "AAPL", Side::Buy, 100, 149.0).unwrap())
        .unwrap();
    engine
        .submit(Order::limit("a", "AAPL", Side::Buy, 200, 148.0).unwrap())
        .unwrap();
    engine
        .submit(Order::limit("a", "AAPL", Side::Sell, 150, 151.0).unwrap())
        .unwrap();
    engine
        .submit(Order::limit("a", "AAPL", Side::Sell, 100, 152.0).unwrap())
        .unwrap();
    thread::sleep(SETTLE);
    let trades = engine.drain();
    assert!(trades.is_empty());

    let depth = engine.depth("AAPL", 3).unwrap();
    assert_eq!(
        depth.bids,
        vec![
            DepthLevel { price: 149.0, quantity: 100 },
            DepthLevel { price: 148.0, quantity: 200 },
        ]
    );
    assert_eq!(
        depth.asks,
        vec![
            DepthLevel { price: 151.0, quantity: 150 },
            DepthLevel { price: 152.0, quantity: 100 },
        ]
    );
}
