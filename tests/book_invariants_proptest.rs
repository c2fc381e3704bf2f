//! Property tests for the book-replica invariants pinned in spec §8.

use flowbook_core::book::{BookReplica, ContinuityMode, DiffEvent};
use flowbook_core::metrics::{imbalance, mid};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..100_000).prop_map(Decimal::from)
}

fn arb_qty() -> impl Strategy<Value = Decimal> {
    (1i64..1_000).prop_map(Decimal::from)
}

proptest! {
    /// Invariant 1 + 2: after any sequence of diffs that don't trigger a
    /// crossed-book error, the book is never crossed and every stored
    /// quantity is strictly positive.
    #[test]
    fn book_never_crossed_and_quantities_stay_positive(
        bid_price in arb_price(),
        ask_gap in 1i64..1000,
        deltas in prop::collection::vec((any::<bool>(), arb_qty()), 0..20),
    ) {
        let _ = tracing_subscriber::fmt::try_init();

        let ask_price = bid_price + Decimal::from(ask_gap);
        let mut replica = BookReplica::new();
        replica.load_snapshot(1, vec![(bid_price, Decimal::ONE)], vec![(ask_price, Decimal::ONE)]);

        let mut u = 1u64;
        for (is_bid, qty) in deltas {
            u += 1;
            // Perturb a level strictly inside the spread so it can never cross.
            let price = if is_bid { bid_price } else { ask_price };
            let event = DiffEvent {
                first_update_id: u,
                last_update_id: u,
                bids: if is_bid { vec![(price, qty)] } else { vec![] },
                asks: if is_bid { vec![] } else { vec![(price, qty)] },
            };
            if replica.apply_diff(&event, ContinuityMode::Strict).is_ok() {
                prop_assert!(!replica.is_crossed());
                for (_, q) in replica.bids().iter_ascending() {
                    prop_assert!(*q > Decimal::ZERO);
                }
                for (_, q) in replica.asks().iter_ascending() {
                    prop_assert!(*q > Decimal::ZERO);
                }
            }
        }
    }

    /// Invariant 3: last_update_id is strictly non-decreasing across
    /// successfully applied diffs.
    #[test]
    fn last_update_id_strictly_increases_on_success(
        ids in prop::collection::vec(2u64..10_000, 1..30),
    ) {
        let mut sorted_unique: Vec<u64> = ids;
        sorted_unique.sort_unstable();
        sorted_unique.dedup();

        let mut replica = BookReplica::new();
        replica.load_snapshot(1, vec![(Decimal::from(100), Decimal::ONE)], vec![(Decimal::from(101), Decimal::ONE)]);

        let mut last_seen = 1u64;
        for u in sorted_unique {
            let event = DiffEvent {
                first_update_id: u,
                last_update_id: u,
                bids: vec![],
                asks: vec![],
            };
            if u > last_seen {
                replica.apply_diff(&event, ContinuityMode::Bridging).ok();
            }
            prop_assert!(replica.last_update_id() >= last_seen);
            last_seen = replica.last_update_id();
        }
    }

    /// Invariant 4: imbalance stays in [-1, 1] regardless of volume inputs.
    #[test]
    fn imbalance_bounded_in_unit_interval(bid_vol in 0i64..1_000_000, ask_vol in 0i64..1_000_000) {
        let value = imbalance(Decimal::from(bid_vol), Decimal::from(ask_vol));
        prop_assert!(value >= -Decimal::ONE);
        prop_assert!(value <= Decimal::ONE);
    }

    /// Invariant 4: mid lies between best bid and best ask whenever both exist.
    #[test]
    fn mid_lies_between_best_bid_and_ask(bid in arb_price(), gap in 1i64..1000) {
        let ask = bid + Decimal::from(gap);
        let m = mid(Some(bid), Some(ask));
        prop_assert!(m >= bid);
        prop_assert!(m <= ask);
    }
}
