//! Price-time priority matching for incoming limit and market orders.

use super::book::{AskEntry, BidEntry, OrderBook};
use crate::orders::{Order, OrderId, OrderType, Side, Trade, TradeId};
use tracing::trace;

impl OrderBook {
    /// Routes an incoming order through the matching loop and returns the
    /// trades it produced, in execution order.
    ///
    /// Limit orders match against the opposite side while they cross; any
    /// remainder is inserted into the book. Market orders match without a
    /// price filter; a remainder left when liquidity runs out is dropped,
    /// keeping whatever status the fill rule assigned.
    ///
    /// Produced trades are appended to the book's trade log, and the
    /// last-trade fields are refreshed from the final fill.
    pub fn add(&mut self, order: Order) -> Vec<Trade> {
        trace!(
            order_id = %order.id,
            symbol = %self.symbol,
            side = %order.side,
            order_type = %order.order_type,
            quantity = order.quantity,
            "adding order to book"
        );
        let trades = match order.order_type {
            OrderType::Market => self.execute_market_order(order),
            OrderType::Limit => self.execute_limit_order(order),
        };

        if let Some(last) = trades.last() {
            self.last_trade_price = Some(last.price);
            self.last_trade_quantity = last.quantity;
        }
        self.trades.extend(trades.iter().cloned());
        trades
    }

    /// Matches what crosses, then rests the remainder on its own side.
    fn execute_limit_order(&mut self, mut order: Order) -> Vec<Trade> {
        let limit = order.price;
        let trades = self.match_incoming(&mut order, limit);
        if order.remaining_quantity() > 0 {
            self.rest(order);
        }
        trades
    }

    /// Matches against the best available prices until filled or the book
    /// runs dry. The residual is never booked.
    fn execute_market_order(&mut self, mut order: Order) -> Vec<Trade> {
        self.match_incoming(&mut order, None)
    }

    /// The core loop: peek the opposite top, evict stale entries, stop when
    /// the price filter fails, otherwise fill at the resting price.
    fn match_incoming(&mut self, incoming: &mut Order, limit: Option<f64>) -> Vec<Trade> {
        let mut trades = Vec::new();

        while incoming.remaining_quantity() > 0 {
            // Stale entries must go before the price filter runs, otherwise a
            // cancelled order's price could terminate the loop early.
            self.evict_stale_opposite(incoming.side);
            let Some((resting_price, resting_id)) = self.peek_opposite(incoming.side) else {
                break;
            };

            if let Some(limit_price) = limit {
                let crosses = match incoming.side {
                    Side::Buy => resting_price <= limit_price,
                    Side::Sell => resting_price >= limit_price,
                };
                if !crosses {
                    break;
                }
            }

            let Some(resting) = self.orders.get_mut(&resting_id) else {
                break;
            };
            let quantity = incoming.remaining_quantity().min(resting.remaining_quantity());
            resting.apply_fill(quantity);
            incoming.apply_fill(quantity);
            let resting_done = resting.remaining_quantity() == 0;
            let resting_agent = resting.agent_id.clone();
            let resting_effective = resting.effective_timestamp();

            trades.push(self.build_trade(
                incoming,
                resting_id,
                &resting_agent,
                resting_effective,
                quantity,
                resting_price,
            ));

            if resting_done {
                self.pop_opposite(incoming.side);
                self.orders.remove(&resting_id);
            }
        }

        trades
    }

    /// Inserts a limit order with unfilled quantity into its side heap and
    /// the id index, assigning the next insertion sequence.
    fn rest(&mut self, order: Order) {
        // Market orders never rest; their residual is discarded upstream.
        let Some(price) = order.price else { return };
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        match order.side {
            Side::Buy => self.bids.push(BidEntry {
                price,
                sequence,
                order_id: order.id,
            }),
            Side::Sell => self.asks.push(AskEntry {
                price,
                sequence,
                order_id: order.id,
            }),
        }
        trace!(order_id = %order.id, symbol = %self.symbol, price, "order resting in book");
        self.orders.insert(order.id, order);
    }

    /// Trade price is always the resting order's price; the aggressor keeps
    /// any price improvement. The timestamp is the later effective arrival.
    fn build_trade(
        &self,
        incoming: &Order,
        resting_id: OrderId,
        resting_agent: &str,
        resting_effective: u64,
        quantity: u64,
        price: f64,
    ) -> Trade {
        let (buy_order_id, buyer_agent_id, sell_order_id, seller_agent_id) = if incoming.is_buy() {
            (
                incoming.id,
                incoming.agent_id.clone(),
                resting_id,
                resting_agent.to_string(),
            )
        } else {
            (
                resting_id,
                resting_agent.to_string(),
                incoming.id,
                incoming.agent_id.clone(),
            )
        };

        Trade {
            id: TradeId::new(),
            symbol: self.symbol.clone(),
            quantity,
            price,
            timestamp: incoming.effective_timestamp().max(resting_effective),
            buy_order_id,
            sell_order_id,
            buyer_agent_id,
            seller_agent_id,
        }
    }

    fn peek_opposite(&self, side: Side) -> Option<(f64, OrderId)> {
        match side {
            Side::Buy => self.asks.peek().map(|entry| (entry.price, entry.order_id)),
            Side::Sell => self.bids.peek().map(|entry| (entry.price, entry.order_id)),
        }
    }

    fn pop_opposite(&mut self, side: Side) {
        match side {
            Side::Buy => {
                self.asks.pop();
            }
            Side::Sell => {
                self.bids.pop();
            }
        }
    }

    fn evict_stale_opposite(&mut self, side: Side) {
        match side {
            Side::Buy => self.evict_stale_asks(),
            Side::Sell => self.evict_stale_bids(),
        }
    }
}
