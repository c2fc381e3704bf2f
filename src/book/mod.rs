//! Local order-book replica: price-level maps plus snapshot/diff synchronization.

pub mod levels;
pub mod replica;

pub use levels::PriceLevels;
pub use replica::{AppliedDiff, BookReplica, ContinuityMode, DiffEvent, QueuePosition, TopOfBook};
