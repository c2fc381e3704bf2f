//! Upstream feed collaborator: wire types, session FSM, and source traits.

pub mod session;
pub mod source;
pub mod types;

pub use session::SessionState;
pub use source::{HttpSnapshotSource, MockFeedSource, SnapshotSource, StreamSource};
pub use types::{DepthMessage, FeedEvent, SnapshotMessage, StreamEnvelope, TradeMessage};
