//! Paper-trading matching engine: simulated submission latency, market
//! walk-the-book fills, limit-order queue advancement from the trade tape.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::book::BookReplica;
use crate::errors::MatcherError;
use crate::order::{Order, OrderId, OrderSide, OrderStatus, OrderStore, OrderType};
use crate::portfolio::{Portfolio, PortfolioSnapshot};

/// A trade-tape event, already decoded from the feed wire shape.
#[derive(Debug, Clone, Copy)]
pub struct TradeEvent {
    pub price: Decimal,
    pub quantity: Decimal,
    /// Exchange flag: `true` means the buyer is the resting (maker) side.
    pub buyer_is_maker: bool,
}

/// Draws a submission-latency sample in milliseconds. Production code uses
/// [`UniformLatency`]; tests inject a fixed or scripted value (spec §9:
/// "the RNG must be test-injectable").
pub trait LatencySource: Send + Sync {
    fn sample_millis(&self, min_ms: u64, max_ms: u64) -> u64;
}

/// Uniform draw over `[min_ms, max_ms]`, the production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformLatency;

impl LatencySource for UniformLatency {
    fn sample_millis(&self, min_ms: u64, max_ms: u64) -> u64 {
        if max_ms <= min_ms {
            return min_ms;
        }
        rand::Rng::gen_range(&mut rand::thread_rng(), min_ms..=max_ms)
    }
}

/// Fixed latency for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedLatency(pub u64);

impl LatencySource for FixedLatency {
    fn sample_millis(&self, _min_ms: u64, _max_ms: u64) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatcherConfig {
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: 50,
            max_latency_ms: 200,
        }
    }
}

/// The paper matcher. Holds the order catalog and the portfolio it mutates
/// on fill. Shared across the feed task, periodic broadcaster, and order
/// handlers per spec §5 — `reset` reinitializes fields in place so any
/// outstanding reference keeps observing the same instance.
pub struct PaperMatcher {
    config: MatcherConfig,
    symbol: String,
    store: OrderStore,
    portfolio: Portfolio,
    latency: Arc<dyn LatencySource>,
}

impl PaperMatcher {
    pub fn new(symbol: impl Into<String>, config: MatcherConfig, portfolio: Portfolio) -> Self {
        Self {
            config,
            symbol: symbol.into(),
            store: OrderStore::new(),
            portfolio,
            latency: Arc::new(UniformLatency),
        }
    }

    pub fn with_latency_source(mut self, source: Arc<dyn LatencySource>) -> Self {
        self.latency = source;
        self
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn set_fees_enabled(&mut self, enabled: bool) {
        self.portfolio.set_fees_enabled(enabled);
    }

    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.store.get(id)
    }

    pub fn open_order_count(&self) -> usize {
        self.store.open_count()
    }

    fn validate(
        quantity: Decimal,
        order_type: OrderType,
        price: Option<Decimal>,
    ) -> Result<(), MatcherError> {
        if quantity <= Decimal::ZERO {
            return Err(MatcherError::InvalidOrderInput {
                reason: "quantity must be positive".into(),
            });
        }
        if order_type == OrderType::Limit {
            match price {
                Some(p) if p > Decimal::ZERO => {}
                _ => {
                    return Err(MatcherError::InvalidOrderInput {
                        reason: "limit order requires a positive price".into(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Registers a PENDING order, then awaits simulated submission latency.
    /// After latency: LIMIT orders become OPEN and enter the open-order
    /// index; MARKET orders stay PENDING until [`Self::execute_market`] is
    /// called against the current book.
    pub async fn place_order(
        &mut self,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Result<OrderId, MatcherError> {
        Self::validate(quantity, order_type, price)?;

        let id = OrderId::new_random();
        let order = Order::new(id.clone(), self.symbol.clone(), side, order_type, quantity, price);
        self.store.insert(order);

        let latency_ms = self
            .latency
            .sample_millis(self.config.min_latency_ms, self.config.max_latency_ms);
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;

        if order_type == OrderType::Limit {
            self.store.mark_open(&id);
        }

        Ok(id)
    }

    /// Walks the opposite-side book levels best-to-worst, filling as much of
    /// the market order as depth allows. Leftover quantity is recorded as a
    /// partial fill; [`MatcherError::InsufficientLiquidity`] is returned but
    /// the partial fill still stands (the caller should log it as a warning
    /// per spec §7, not treat it as a rollback).
    pub fn execute_market(
        &mut self,
        id: &OrderId,
        book: &BookReplica,
    ) -> Result<(), MatcherError> {
        let order = self
            .store
            .get(id)
            .ok_or_else(|| MatcherError::OrderNotFound(id.to_string()))?
            .clone();

        if order.status != OrderStatus::Pending || order.order_type != OrderType::Market {
            return Err(MatcherError::OrderNotOpen(id.to_string()));
        }

        let levels = match order.side {
            OrderSide::Buy => book.asks().top_ascending(usize::MAX),
            OrderSide::Sell => book.bids().top_descending(usize::MAX),
        };

        let mut remaining = order.quantity;
        let mut filled = Decimal::ZERO;
        let mut cost = Decimal::ZERO;

        for (price, level_qty) in levels {
            if remaining <= Decimal::ZERO {
                break;
            }
            let fill = remaining.min(level_qty);
            cost += fill * price;
            filled += fill;
            remaining -= fill;
        }

        let avg_price = if filled > Decimal::ZERO {
            cost / filled
        } else {
            Decimal::ZERO
        };

        if filled > Decimal::ZERO {
            self.finalize_fill(id, filled, avg_price, false);
        }

        if remaining > Decimal::ZERO {
            warn!(%remaining, order = %id, "market order only partially filled");
            return Err(MatcherError::InsufficientLiquidity {
                filled,
                requested: order.quantity,
            });
        }

        Ok(())
    }

    /// Advances every open limit order against one incoming trade, per the
    /// queue-advancement approximation in spec §4.4.
    pub fn on_trade(&mut self, trade: TradeEvent) {
        let candidates: Vec<OrderId> = self.store.open_order_ids().cloned().collect();

        for id in candidates {
            let Some(order) = self.store.get(&id) else {
                continue;
            };
            let Some(limit_price) = order.price else {
                continue;
            };
            let side = order.side;

            let through_traded = match side {
                OrderSide::Buy => trade.price < limit_price,
                OrderSide::Sell => trade.price > limit_price,
            };
            let at_price_opposing_flow = match side {
                OrderSide::Buy => trade.price == limit_price && trade.buyer_is_maker,
                OrderSide::Sell => trade.price == limit_price && !trade.buyer_is_maker,
            };

            if through_traded {
                self.finalize_fill(&id, order.quantity - order.filled_quantity, limit_price, true);
                continue;
            }

            if at_price_opposing_flow {
                let quantity = order.quantity;
                if let Some(order_mut) = self.store.get_mut(&id) {
                    order_mut.processed_volume += trade.quantity;
                    if order_mut.processed_volume > quantity {
                        let remaining = order_mut.quantity - order_mut.filled_quantity;
                        drop(order_mut);
                        self.finalize_fill(&id, remaining, limit_price, true);
                    }
                }
            }
        }
    }

    fn finalize_fill(&mut self, id: &OrderId, qty: Decimal, price: Decimal, is_maker: bool) {
        if qty <= Decimal::ZERO {
            return;
        }
        let side = match self.store.get(id) {
            Some(order) => order.side,
            None => return,
        };

        let fee = self.portfolio.apply_fill(side, qty, price, is_maker);

        let fully_filled = if let Some(order) = self.store.get_mut(id) {
            let new_filled = order.filled_quantity + qty;
            order.avg_fill_price = Some(price);
            order.filled_quantity = new_filled;
            let fully_filled = new_filled >= order.quantity;
            if fully_filled {
                order.status = OrderStatus::Filled;
            }
            fully_filled
        } else {
            false
        };

        if fully_filled {
            self.store.mark_terminal(id, OrderStatus::Filled);
        }

        info!(order = %id, %qty, %price, %fee, is_maker, "order filled");
    }

    pub fn cancel(&mut self, id: &OrderId) -> Result<(), MatcherError> {
        match self.store.get(id) {
            Some(order) if order.status == OrderStatus::Open => {
                self.store.mark_terminal(id, OrderStatus::Cancelled);
                Ok(())
            }
            Some(_) => Err(MatcherError::OrderNotOpen(id.to_string())),
            None => Err(MatcherError::OrderNotFound(id.to_string())),
        }
    }

    pub fn cancel_all(&mut self) -> usize {
        let ids: Vec<OrderId> = self.store.open_order_ids().cloned().collect();
        let count = ids.len();
        for id in ids {
            self.store.mark_terminal(&id, OrderStatus::Cancelled);
        }
        count
    }

    /// Restores initial portfolio balances and clears all orders, preserving
    /// instance identity.
    pub fn reset(&mut self) {
        self.store.clear();
        self.portfolio.reset();
    }

    pub fn portfolio_snapshot(&self, mark_price: Decimal) -> PortfolioSnapshot {
        self.portfolio.snapshot(mark_price, self.store.open_count())
    }
}
