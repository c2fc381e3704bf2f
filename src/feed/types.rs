//! Wire types for the upstream feed (spec §6).

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::book::DiffEvent;
use crate::matcher::TradeEvent;

/// Raw REST snapshot response: `{lastUpdateId, bids, asks}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotMessage {
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

/// Raw depth-diff payload: `U`, `u`, `b`, `a`.
#[derive(Debug, Clone, Deserialize)]
pub struct DepthMessage {
    #[serde(rename = "U")]
    pub first_update_id: u64,
    #[serde(rename = "u")]
    pub last_update_id: u64,
    #[serde(rename = "b", default)]
    pub bids: Vec<(Decimal, Decimal)>,
    #[serde(rename = "a", default)]
    pub asks: Vec<(Decimal, Decimal)>,
}

impl From<DepthMessage> for DiffEvent {
    fn from(msg: DepthMessage) -> Self {
        DiffEvent {
            first_update_id: msg.first_update_id,
            last_update_id: msg.last_update_id,
            bids: msg.bids,
            asks: msg.asks,
        }
    }
}

/// Raw trade payload: `p`, `q`, `m`.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeMessage {
    #[serde(rename = "p")]
    pub price: Decimal,
    #[serde(rename = "q")]
    pub quantity: Decimal,
    #[serde(rename = "m")]
    pub buyer_is_maker: bool,
}

impl From<TradeMessage> for TradeEvent {
    fn from(msg: TradeMessage) -> Self {
        TradeEvent {
            price: msg.price,
            quantity: msg.quantity,
            buyer_is_maker: msg.buyer_is_maker,
        }
    }
}

/// One multiplexed stream envelope: `{stream, data}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEnvelope<T> {
    pub stream: String,
    pub data: T,
}

/// Either kind of payload that can arrive on the multiplexed stream.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Depth(DepthMessage),
    Trade(TradeMessage),
}
