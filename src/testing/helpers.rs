//! Test helper utilities: scenario builders and latency assertions.

use std::time::{Duration, Instant};

use rust_decimal::Decimal;

use crate::book::{BookReplica, DiffEvent};

/// Builds a book already snapshotted at `last_update_id` with the given
/// flat `(price, qty)` levels, for use as a scenario starting point.
pub fn snapshot_book(
    last_update_id: u64,
    bids: Vec<(Decimal, Decimal)>,
    asks: Vec<(Decimal, Decimal)>,
) -> BookReplica {
    let mut book = BookReplica::new();
    book.load_snapshot(last_update_id, bids, asks);
    book
}

/// Builds a strictly-sequential diff event with no level changes, useful
/// for advancing `last_update_id` without touching book contents.
pub fn noop_diff(update_id: u64) -> DiffEvent {
    DiffEvent {
        first_update_id: update_id,
        last_update_id: update_id,
        bids: vec![],
        asks: vec![],
    }
}

/// Asserts an operation completes within `max_latency`.
pub fn assert_within_latency<F>(max_latency: Duration, operation: F, operation_name: &str)
where
    F: FnOnce(),
{
    let start = Instant::now();
    operation();
    let elapsed = start.elapsed();
    assert!(
        elapsed <= max_latency,
        "{} took {:?}, expected <= {:?}",
        operation_name,
        elapsed,
        max_latency
    );
}
