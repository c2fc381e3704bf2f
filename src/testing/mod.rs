//! Test-only scaffolding: scenario builders, latency helpers.
//!
//! The mock feed source itself lives at [`crate::feed::source::MockFeedSource`]
//! since it also has legitimate non-test uses (local replay, fixtures).

pub mod helpers;

pub use helpers::{assert_within_latency, noop_diff, snapshot_book};
