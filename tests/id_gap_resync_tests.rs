//! Strict-mode continuity and the resync path it forces (spec §4.1, §7).

use flowbook_core::book::{BookReplica, ContinuityMode, DiffEvent};
use flowbook_core::BookError;
use rust_decimal_macros::dec;

#[test]
fn strict_mode_id_gap_is_detected_and_fatal() {
    let _ = tracing_subscriber::fmt::try_init();

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
    assert!(err.is_fatal_to_session());
    // last_update_id is unchanged: the gapped event never applied.
    assert_eq!(replica.last_update_id(), 150);
}

#[test]
fn crossed_book_is_treated_as_fatal_like_id_gap() {
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
    assert!(err.is_fatal_to_session());
}

#[test]
fn resync_after_gap_reloads_snapshot_and_re_enters_bridging() {
    let mut replica = BookReplica::new();
    replica.load_snapshot(150, vec![(dec!(100), dec!(1))], vec![(dec!(101), dec!(1))]);

    let gap = DiffEvent {
        first_update_id: 152,
        last_update_id: 155,
        bids: vec![],
        asks: vec![],
    };
    replica
        .apply_diff(&gap, ContinuityMode::Strict)
        .unwrap_err();

    // Feed session reloads a fresh snapshot...
    replica.load_snapshot(200, vec![(dec!(110), dec!(2))], vec![(dec!(111), dec!(2))]);
    // ...and re-enters bridging for the first post-snapshot event.
    let bridge_event = DiffEvent {
        first_update_id: 199,
        last_update_id: 205,
        bids: vec![],
        asks: vec![],
    };
    replica
        .apply_diff(&bridge_event, ContinuityMode::Bridging)
        .expect("bridging predicate holds after resync");
    assert_eq!(replica.last_update_id(), 205);
}

#[test]
fn stale_event_older_than_last_update_id_is_dropped_silently() {
    let mut replica = BookReplica::new();
    replica.load_snapshot(100, vec![(dec!(100), dec!(1))], vec![(dec!(101), dec!(1))]);

    let stale = DiffEvent {
        first_update_id: 90,
        last_update_id: 100,
        bids: vec![(dec!(999), dec!(9))],
        asks: vec![],
    };
    let err = replica
        .apply_diff(&stale, ContinuityMode::Strict)
        .unwrap_err();
    assert_eq!(
        err,
        BookError::StaleEvent {
            u: 100,
            last_update_id: 100
        }
    );
    assert!(!err.is_fatal_to_session());
    // Book contents are untouched by the stale event.
    assert_eq!(replica.bids().quantity_at(dec!(999)), None);
}

#[test]
fn last_update_id_is_strictly_nondecreasing_across_applied_diffs() {
    let mut replica = BookReplica::new();
    replica.load_snapshot(100, vec![(dec!(100), dec!(1))], vec![(dec!(101), dec!(1))]);

    let mut seen = replica.last_update_id();
    for u in 101..=200u64 {
        let event = DiffEvent {
            first_update_id: u,
            last_update_id: u,
            bids: vec![],
            asks: vec![],
        };
        replica.apply_diff(&event, ContinuityMode::Strict).unwrap();
        assert!(replica.last_update_id() > seen);
        seen = replica.last_update_id();
    }
}
