//! Domain-specific error types.
//!
//! Book integrity and matcher validation errors are closed enums via
//! `thiserror`, matching the failure-kind table in the system design.
//! Network-boundary failures (snapshot fetch) use `anyhow` instead, the
//! way the teacher's execution adapters do.

use rust_decimal::Decimal;

/// Errors raised while applying a snapshot or diff to the book.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
    /// Diff's `u` is not newer than `last_update_id`; caller should drop it silently.
    #[error("stale event: u={u} <= last_update_id={last_update_id}")]
    StaleEvent { u: u64, last_update_id: u64 },

    /// Strict-mode continuity broken: `U != last_update_id + 1`.
    #[error("id gap: expected U={expected}, got U={got}")]
    IdGap { expected: u64, got: u64 },

    /// Bridging predicate `U <= last_update_id + 1 <= u` failed.
    #[error("bridging failed: U={u_first}, last_update_id={last_update_id}, u={u_last}")]
    BridgingFailed {
        u_first: u64,
        last_update_id: u64,
        u_last: u64,
    },

    /// Book crossed (`best_bid >= best_ask`) after applying a diff.
    #[error("crossed book: best_bid={best_bid} >= best_ask={best_ask}")]
    CrossedBook { best_bid: Decimal, best_ask: Decimal },

    /// A price/qty field in the event could not be parsed.
    #[error("parse failure: {reason}")]
    ParseFailure { reason: String },
}

impl BookError {
    /// Whether this error forces the feed session to tear down and resync,
    /// per the §7 error-handling policy table.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(self, BookError::IdGap { .. } | BookError::CrossedBook { .. })
    }
}

/// Errors raised by the Paper Matcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    #[error("invalid order input: {reason}")]
    InvalidOrderInput { reason: String },

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("order {0} is not open")]
    OrderNotOpen(String),

    /// Market order could not be fully filled against the available depth.
    /// Not a hard failure: the partial fill is still recorded by the caller.
    #[error("insufficient liquidity: filled {filled} of {requested}")]
    InsufficientLiquidity { filled: Decimal, requested: Decimal },
}

/// Errors surfaced while parsing feed wire messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("malformed feed payload: {reason}")]
    ParseFailure { reason: String },

    #[error("feed disconnected: {reason}")]
    Disconnected { reason: String },
}
