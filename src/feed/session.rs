//! Feed session state machine: DISCONNECTED -> SNAPSHOT_LOADING -> BRIDGING
//! -> STREAMING, with backoff-on-fatal-error reconnect (spec §4.5).
//!
//! Typestate shape grounded on `core/connection_fsm.rs`: each state is a
//! distinct struct wrapping shared session data, and transitions consume
//! `self` and return the next state. A type-erased [`SessionState`] wrapper
//! lets callers hold "whatever state we're in right now" without a trait
//! object.

use crate::resilience::backoff::{BackoffConfig, ExponentialBackoff};

/// Fields carried across every state.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub symbol: String,
    pub reconnect_count: u64,
}

impl SessionData {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            reconnect_count: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Disconnected {
    pub data: SessionData,
    pub backoff: ExponentialBackoff,
}

#[derive(Debug, Clone)]
pub struct SnapshotLoading {
    pub data: SessionData,
}

#[derive(Debug, Clone)]
pub struct Bridging {
    pub data: SessionData,
    pub snapshot_last_update_id: u64,
}

#[derive(Debug, Clone)]
pub struct Streaming {
    pub data: SessionData,
}

impl Disconnected {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            data: SessionData::new(symbol),
            backoff: ExponentialBackoff::with_config(BackoffConfig::feed_reconnect()),
        }
    }

    /// Begins (re)establishing the session: load the REST snapshot next.
    pub fn begin_snapshot_load(self) -> SnapshotLoading {
        SnapshotLoading { data: self.data }
    }
}

impl SnapshotLoading {
    /// Snapshot fetched successfully; enter bridging with its `lastUpdateId`.
    pub fn snapshot_loaded(self, snapshot_last_update_id: u64) -> Bridging {
        Bridging {
            data: self.data,
            snapshot_last_update_id,
        }
    }

    /// Snapshot fetch failed: fall back to disconnected with backoff.
    pub fn snapshot_failed(self) -> Disconnected {
        let mut data = self.data;
        data.reconnect_count += 1;
        Disconnected {
            data,
            backoff: ExponentialBackoff::with_config(BackoffConfig::feed_reconnect()),
        }
    }
}

impl Bridging {
    /// The bridging predicate (§4.1 step 2) held: enter streaming.
    pub fn bridged(self) -> Streaming {
        Streaming { data: self.data }
    }

    /// Bridging failed (non-fatal): stay in bridging, retry the next event.
    pub fn retry_bridge(self) -> Bridging {
        self
    }

    /// A fatal book error (`IdGap`/`CrossedBook`) arrived even before
    /// bridging completed: tear down and reconnect.
    pub fn fatal_error(self) -> Disconnected {
        let mut data = self.data;
        data.reconnect_count += 1;
        Disconnected {
            data,
            backoff: ExponentialBackoff::with_config(BackoffConfig::feed_reconnect()),
        }
    }
}

impl Streaming {
    /// A fatal book error forces teardown, reload snapshot, re-bridge.
    pub fn fatal_error(self) -> Disconnected {
        let mut data = self.data;
        data.reconnect_count += 1;
        Disconnected {
            data,
            backoff: ExponentialBackoff::with_config(BackoffConfig::feed_reconnect()),
        }
    }

    /// Socket dropped outright: same recovery path as a fatal book error.
    pub fn disconnected(self) -> Disconnected {
        self.fatal_error()
    }
}

/// Type-erased wrapper so a caller can store "whichever state we're
/// currently in" without generics leaking into the owning struct.
#[derive(Debug, Clone)]
pub enum SessionState {
    Disconnected(Disconnected),
    SnapshotLoading(SnapshotLoading),
    Bridging(Bridging),
    Streaming(Streaming),
}

impl SessionState {
    pub fn new(symbol: impl Into<String>) -> Self {
        SessionState::Disconnected(Disconnected::new(symbol))
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            SessionState::Disconnected(_) => "DISCONNECTED",
            SessionState::SnapshotLoading(_) => "SNAPSHOT_LOADING",
            SessionState::Bridging(_) => "BRIDGING",
            SessionState::Streaming(_) => "STREAMING",
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, SessionState::Streaming(_))
    }
}

impl From<Disconnected> for SessionState {
    fn from(s: Disconnected) -> Self {
        SessionState::Disconnected(s)
    }
}
impl From<SnapshotLoading> for SessionState {
    fn from(s: SnapshotLoading) -> Self {
        SessionState::SnapshotLoading(s)
    }
}
impl From<Bridging> for SessionState {
    fn from(s: Bridging) -> Self {
        SessionState::Bridging(s)
    }
}
impl From<Streaming> for SessionState {
    fn from(s: Streaming) -> Self {
        SessionState::Streaming(s)
    }
}
