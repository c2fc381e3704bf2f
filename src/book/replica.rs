//! Snapshot-plus-diff order book replica with continuity enforcement.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::errors::BookError;

use super::levels::PriceLevels;

/// Best bid/ask price and quantity captured after an applied diff.
///
/// `None` on a side means that side was empty at capture time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopOfBook {
    pub bid: Option<(Decimal, Decimal)>,
    pub ask: Option<(Decimal, Decimal)>,
}

/// A depth-diff event as received from the feed, already decoded out of its
/// wire shape (see [`crate::feed::types::DepthEvent`]).
#[derive(Debug, Clone)]
pub struct DiffEvent {
    pub first_update_id: u64,
    pub last_update_id: u64,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

/// Continuity mode used by [`BookReplica::apply_diff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuityMode {
    /// `U == last_update_id + 1` is required.
    Strict,
    /// `U <= last_update_id + 1 <= u` is required — used for the first event
    /// after a snapshot load, where the snapshot's `lastUpdateId` may fall
    /// strictly inside the event's `[U, u]` range.
    Bridging,
}

/// Resting volume ahead of a hypothetical order, approximated from the
/// current book depth at submission time. Supplemental query (see
/// `SPEC_FULL.md` §C.2) — independent of the matcher's own fill heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePosition {
    pub level_index: usize,
    pub size_ahead: Decimal,
    pub level_total: Decimal,
}

impl QueuePosition {
    /// Rough probability of fill before the level is exhausted, in (0, 1].
    /// A hypothetical order joins behind all resting volume at the price
    /// (`size_ahead` is the full level), so weighing `size_ahead` against
    /// itself would always floor out at zero; instead this combines how
    /// deep the level sits (`level_index`, worse levels trade less often)
    /// with how much volume must clear first — both factors decay toward
    /// zero but never reach it, keeping the result in (0, 1] as documented.
    pub fn fill_probability(&self) -> f64 {
        if self.level_total <= Decimal::ZERO {
            return 1.0;
        }
        let ahead = self.size_ahead.to_f64().unwrap_or(0.0);
        let level_reach = 1.0 / (1.0 + self.level_index as f64);
        let volume_factor = 1.0 / (1.0 + ahead);
        (level_reach * volume_factor).clamp(0.0, 1.0)
    }
}

/// Outcome of a successfully applied diff: the top-of-book readings the
/// metric pipeline needs to compute the next OFI contribution.
#[derive(Debug, Clone, Copy)]
pub struct AppliedDiff {
    pub previous: TopOfBook,
    pub current: TopOfBook,
}

/// The local order-book replica for a single symbol.
#[derive(Debug, Clone)]
pub struct BookReplica {
    bids: PriceLevels,
    asks: PriceLevels,
    last_update_id: u64,
    top_of_book: TopOfBook,
}

impl Default for BookReplica {
    fn default() -> Self {
        Self::new()
    }
}

impl BookReplica {
    pub fn new() -> Self {
        Self {
            bids: PriceLevels::new(),
            asks: PriceLevels::new(),
            last_update_id: 0,
            top_of_book: TopOfBook::default(),
        }
    }

    pub fn last_update_id(&self) -> u64 {
        self.last_update_id
    }

    pub fn bids(&self) -> &PriceLevels {
        &self.bids
    }

    pub fn asks(&self) -> &PriceLevels {
        &self.asks
    }

    pub fn top_of_book(&self) -> TopOfBook {
        self.top_of_book
    }

    pub fn best_bid(&self) -> Option<(Decimal, Decimal)> {
        self.bids.highest()
    }

    pub fn best_ask(&self) -> Option<(Decimal, Decimal)> {
        self.asks.lowest()
    }

    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some((bb, _)), Some((ba, _))) => bb >= ba,
            _ => false,
        }
    }

    /// Loads a fresh snapshot: clears both sides, repopulates, sets
    /// `last_update_id`, and refreshes top-of-book memory.
    pub fn load_snapshot(
        &mut self,
        last_update_id: u64,
        bids: Vec<(Decimal, Decimal)>,
        asks: Vec<(Decimal, Decimal)>,
    ) {
        self.bids.clear();
        self.asks.clear();
        for (price, qty) in bids {
            self.bids.apply(price, qty);
        }
        for (price, qty) in asks {
            self.asks.apply(price, qty);
        }
        self.last_update_id = last_update_id;
        self.top_of_book = self.capture_top_of_book();
        debug!(last_update_id, "snapshot loaded");
    }

    fn capture_top_of_book(&self) -> TopOfBook {
        TopOfBook {
            bid: self.best_bid(),
            ask: self.best_ask(),
        }
    }

    /// Applies one diff event per the continuity mode. On success returns
    /// the previous/current top-of-book pair for the caller to feed into
    /// the metric pipeline; this must happen before the next diff is read
    /// (see concurrency ordering guarantees).
    pub fn apply_diff(
        &mut self,
        event: &DiffEvent,
        mode: ContinuityMode,
    ) -> Result<AppliedDiff, BookError> {
        if event.last_update_id <= self.last_update_id {
            return Err(BookError::StaleEvent {
                u: event.last_update_id,
                last_update_id: self.last_update_id,
            });
        }

        match mode {
            ContinuityMode::Strict => {
                let expected = self.last_update_id + 1;
                if event.first_update_id != expected {
                    return Err(BookError::IdGap {
                        expected,
                        got: event.first_update_id,
                    });
                }
            }
            ContinuityMode::Bridging => {
                let bridge_point = self.last_update_id + 1;
                if !(event.first_update_id <= bridge_point && bridge_point <= event.last_update_id)
                {
                    return Err(BookError::BridgingFailed {
                        u_first: event.first_update_id,
                        last_update_id: self.last_update_id,
                        u_last: event.last_update_id,
                    });
                }
            }
        }

        let previous = self.top_of_book;

        for &(price, qty) in &event.bids {
            self.bids.apply(price, qty);
        }
        for &(price, qty) in &event.asks {
            self.asks.apply(price, qty);
        }
        self.last_update_id = event.last_update_id;

        let current = self.capture_top_of_book();

        if let (Some((bb, _)), Some((ba, _))) = (current.bid, current.ask) {
            if bb >= ba {
                warn!(%bb, %ba, "crossed book after diff apply");
                return Err(BookError::CrossedBook {
                    best_bid: bb,
                    best_ask: ba,
                });
            }
        }

        self.top_of_book = current;

        Ok(AppliedDiff { previous, current })
    }

    /// Estimates resting volume ahead of a hypothetical order at `price` on
    /// `side`, for the supplemental queue-position query. `is_bid` selects
    /// which side's levels to walk.
    pub fn estimate_queue_position(&self, price: Decimal, is_bid: bool) -> Option<QueuePosition> {
        let levels = if is_bid { &self.bids } else { &self.asks };
        let level_total = levels.quantity_at(price)?;

        let ordered: Vec<(Decimal, Decimal)> = if is_bid {
            levels.top_descending(usize::MAX)
        } else {
            levels.top_ascending(usize::MAX)
        };

        let level_index = ordered.iter().position(|(p, _)| *p == price)?;

        Some(QueuePosition {
            level_index,
            size_ahead: level_total,
            level_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(replica: &mut BookReplica) {
        replica.load_snapshot(
            100,
            vec![(dec!(100), dec!(1))],
            vec![(dec!(101), dec!(1))],
        );
    }

    #[test]
    fn bridging_scenario_from_spec() {
        let mut replica = BookReplica::new();
        snapshot(&mut replica);

        let event = DiffEvent {
            first_update_id: 99,
            last_update_id: 103,
            bids: vec![(dec!(50000), dec!(1))],
            asks: vec![],
        };
        let outcome = replica
            .apply_diff(&event, ContinuityMode::Bridging)
            .expect("bridging predicate holds: 99 <= 101 <= 103");
        assert_eq!(replica.last_update_id(), 103);
        assert_eq!(replica.bids().quantity_at(dec!(50000)), Some(dec!(1)));
        assert!(outcome.current.bid.is_some());
    }

    #[test]
    fn id_gap_in_strict_mode() {
        let mut replica = BookReplica::new();
        replica.load_snapshot(150, vec![(dec!(100), dec!(1))], vec![(dec!(101), dec!(1))]);

        let event = DiffEvent {
            first_update_id: 152,
            last_update_id: 155,
            bids: vec![],
            asks: vec![],
        };
        let err = replica
            .apply_diff(&event, ContinuityMode::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            BookError::IdGap {
                expected: 151,
                got: 152
            }
        );
    }

    #[test]
    fn stale_event_is_dropped() {
        let mut replica = BookReplica::new();
        snapshot(&mut replica);
        let event = DiffEvent {
            first_update_id: 90,
            last_update_id: 100,
            bids: vec![],
            asks: vec![],
        };
        let err = replica
            .apply_diff(&event, ContinuityMode::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            BookError::StaleEvent {
                u: 100,
                last_update_id: 100
            }
        );
    }

    #[test]
    fn crossed_book_detected() {
        let mut replica = BookReplica::new();
        replica.load_snapshot(1, vec![(dec!(100), dec!(1))], vec![(dec!(101), dec!(1))]);
        let event = DiffEvent {
            first_update_id: 2,
            last_update_id: 2,
            bids: vec![(dec!(102), dec!(1))],
            asks: vec![],
        };
        let err = replica
            .apply_diff(&event, ContinuityMode::Strict)
            .unwrap_err();
        assert!(matches!(err, BookError::CrossedBook { .. }));
    }

    #[test]
    fn last_update_id_strictly_nondecreasing() {
        let mut replica = BookReplica::new();
        snapshot(&mut replica);
        for u in 101..=110u64 {
            let event = DiffEvent {
                first_update_id: u,
                last_update_id: u,
                bids: vec![],
                asks: vec![],
            };
            replica.apply_diff(&event, ContinuityMode::Strict).unwrap();
            assert_eq!(replica.last_update_id(), u);
        }
    }

    #[test]
    fn queue_position_reports_full_level_when_alone() {
        let mut replica = BookReplica::new();
        replica.load_snapshot(1, vec![(dec!(100), dec!(5))], vec![]);
        let qp = replica.estimate_queue_position(dec!(100), true).unwrap();
        assert_eq!(qp.size_ahead, dec!(5));
        let probability = qp.fill_probability();
        assert!(probability > 0.0 && probability <= 1.0);
    }
}
