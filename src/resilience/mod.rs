//! Resilience primitives shared by the feed session state machine.

pub mod backoff;

pub use backoff::{BackoffConfig, ExponentialBackoff};
