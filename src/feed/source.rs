//! Feed collaborator abstraction: snapshot fetch + streaming events.
//!
//! Production implementations speak REST + WebSocket against an exchange;
//! tests substitute a scripted mock with a push-then-drain queue.

use async_trait::async_trait;

use super::types::{DepthMessage, FeedEvent, SnapshotMessage, TradeMessage};
use crate::errors::FeedError;

/// Fetches a REST depth snapshot for the configured symbol/depth.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self, symbol: &str, depth: usize) -> anyhow::Result<SnapshotMessage>;
}

/// Yields the next multiplexed stream event.
#[async_trait]
pub trait StreamSource: Send + Sync {
    async fn next_event(&mut self) -> Result<FeedEvent, FeedError>;
}

/// Binance-shaped REST snapshot fetch via `reqwest`.
pub struct HttpSnapshotSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSnapshotSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_snapshot(&self, symbol: &str, depth: usize) -> anyhow::Result<SnapshotMessage> {
        let url = format!("{}/api/v3/depth", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&[("symbol", symbol), ("limit", &depth.to_string())])
            .send()
            .await?
            .error_for_status()?;
        let snapshot = response.json::<SnapshotMessage>().await?;
        Ok(snapshot)
    }
}

/// A scripted snapshot/event source for tests: push expectations, then
/// drain them in FIFO order as the session consumes them.
#[derive(Debug, Default)]
pub struct MockFeedSource {
    pub queued_snapshot: Option<SnapshotMessage>,
    pub queued_events: std::collections::VecDeque<FeedEvent>,
}

impl MockFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_depth(&mut self, msg: DepthMessage) {
        self.queued_events.push_back(FeedEvent::Depth(msg));
    }

    pub fn push_trade(&mut self, msg: TradeMessage) {
        self.queued_events.push_back(FeedEvent::Trade(msg));
    }
}

#[async_trait]
impl SnapshotSource for MockFeedSource {
    async fn fetch_snapshot(&self, _symbol: &str, _depth: usize) -> anyhow::Result<SnapshotMessage> {
        self.queued_snapshot
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no snapshot queued in mock feed"))
    }
}

#[async_trait]
impl StreamSource for MockFeedSource {
    async fn next_event(&mut self) -> Result<FeedEvent, FeedError> {
        self.queued_events
            .pop_front()
            .ok_or_else(|| FeedError::Disconnected {
                reason: "mock feed exhausted".into(),
            })
    }
}
