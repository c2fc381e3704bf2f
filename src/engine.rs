//! Concurrency facade (spec §5): a single exclusive lock spanning one
//! `apply_diff` call, one ladder-payload build, or one order
//! submission/matching sequence — the seam a deployment targeting true
//! parallelism serializes on. The canonical single-threaded cooperative
//! design needs no lock at all; this facade is the variant for a host that
//! wants order handlers on separate tasks anyway.

use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::book::{BookReplica, ContinuityMode, DiffEvent};
use crate::config::EngineConfig;
use crate::errors::{BookError, MatcherError};
use crate::matcher::{PaperMatcher, TradeEvent};
use crate::metrics::{build_ladder, LadderPayload, MetricPipeline};
use crate::order::{OrderId, OrderSide, OrderType};
use crate::portfolio::Portfolio;

struct EngineInner {
    book: BookReplica,
    pipeline: MetricPipeline,
    matcher: PaperMatcher,
    continuity_mode: ContinuityMode,
}

/// Owns the book replica, metric pipeline, and paper matcher for one
/// symbol, and drives them in the order the spec's data-flow diagram
/// requires: depth events update the book then the pipeline; trade events
/// update the pipeline's CVD then advance open limit orders.
pub struct Engine {
    config: EngineConfig,
    inner: Mutex<EngineInner>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let portfolio = Portfolio::new(
            config.portfolio.initial_quote_balance,
            config.portfolio.initial_base_balance,
            config.fees.maker_fee_rate,
            config.fees.taker_fee_rate,
            config.fees.fees_enabled,
        );
        let matcher = PaperMatcher::new(
            config.symbol.clone(),
            config.matcher.clone().into(),
            portfolio,
        );
        let inner = EngineInner {
            book: BookReplica::new(),
            pipeline: MetricPipeline::new(),
            matcher,
            continuity_mode: ContinuityMode::Bridging,
        };
        Self {
            config,
            inner: Mutex::new(inner),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Loads a fresh snapshot and re-enters bridging mode for the next diff.
    pub fn load_snapshot(
        &self,
        last_update_id: u64,
        bids: Vec<(Decimal, Decimal)>,
        asks: Vec<(Decimal, Decimal)>,
    ) {
        let mut guard = self.inner.lock();
        guard.book.load_snapshot(last_update_id, bids, asks);
        guard.continuity_mode = ContinuityMode::Bridging;
    }

    /// Applies one depth-diff event and immediately feeds the resulting
    /// top-of-book transition into the metric pipeline (spec §4.1 steps
    /// 4-7), all under one lock acquisition.
    pub fn apply_depth(&self, event: &DiffEvent) -> Result<(), BookError> {
        let mut guard = self.inner.lock();
        let mode = guard.continuity_mode;
        match guard.book.apply_diff(event, mode) {
            Ok(applied) => {
                guard.pipeline.on_diff_applied(&applied);
                if mode == ContinuityMode::Bridging {
                    guard.continuity_mode = ContinuityMode::Strict;
                }
                Ok(())
            }
            Err(err) => {
                if err.is_fatal_to_session() {
                    guard.continuity_mode = ContinuityMode::Bridging;
                }
                Err(err)
            }
        }
    }

    /// Applies one trade event: updates CVD, then advances open limit
    /// orders against it, completing before the next feed event is read.
    pub fn apply_trade(&self, trade: TradeEvent) {
        let mut guard = self.inner.lock();
        guard.pipeline.on_trade(trade.quantity, trade.buyer_is_maker);
        guard.matcher.on_trade(trade);
    }

    /// Builds one immutable ladder payload reflecting a single consistent
    /// book state (no torn reads, per spec §5's ordering guarantees).
    pub fn ladder_payload(&self, include_portfolio: bool) -> LadderPayload {
        let guard = self.inner.lock();
        let mark = crate::metrics::mid(
            guard.book.best_bid().map(|(p, _)| p),
            guard.book.best_ask().map(|(p, _)| p),
        );
        let portfolio = include_portfolio.then(|| guard.matcher.portfolio_snapshot(mark));
        build_ladder(
            &guard.book,
            &guard.pipeline,
            self.config.book.ladder_depth,
            self.config.book.imbalance_depth,
            portfolio,
        )
    }

    pub async fn submit_order(
        &self,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Result<OrderId, MatcherError> {
        // Note: this holds the lock across the simulated-latency await,
        // which is only sound under the canonical single-threaded
        // cooperative scheduler (spec §5). A true-parallelism deployment
        // should split staging/activation so the lock isn't held while
        // suspended.
        let mut guard = self.inner.lock();
        guard
            .matcher
            .place_order(side, order_type, quantity, price)
            .await
    }

    pub fn execute_market(&self, id: &OrderId) -> Result<(), MatcherError> {
        let mut guard = self.inner.lock();
        let book_snapshot = guard.book.clone();
        guard.matcher.execute_market(id, &book_snapshot)
    }

    pub fn cancel_order(&self, id: &OrderId) -> Result<(), MatcherError> {
        self.inner.lock().matcher.cancel(id)
    }

    pub fn cancel_all(&self) -> usize {
        self.inner.lock().matcher.cancel_all()
    }

    pub fn set_fees_enabled(&self, enabled: bool) {
        self.inner.lock().matcher.set_fees_enabled(enabled);
    }

    pub fn reset(&self) {
        self.inner.lock().matcher.reset();
    }

    /// Clears the OFI window and zeroes CVD. Distinct from [`Self::reset`]:
    /// the data model treats the metric pipeline's accumulators as a
    /// separate user-visible reset from portfolio/order state (spec §3
    /// lifecycles).
    pub fn reset_metrics(&self) {
        self.inner.lock().pipeline.reset();
    }
}
