//! Ladder payload builder: an immutable snapshot for downstream consumers.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::book::BookReplica;
use crate::portfolio::PortfolioSnapshot;

use super::pipeline::MetricPipeline;
use super::pure::{imbalance, microprice, mid, spread};

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MetricVector {
    pub imb: f64,
    pub spread: f64,
    pub mid: f64,
    pub micro: f64,
    pub ofi: f64,
    pub cvd: f64,
}

/// Matches the downstream ladder payload wire shape from spec §6.
#[derive(Debug, Clone, Serialize)]
pub struct LadderPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub bids: Vec<(f64, f64)>,
    pub asks: Vec<(f64, f64)>,
    pub metrics: MetricVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<PortfolioSnapshot>,
}

/// Builds one immutable ladder payload from the current book, pipeline, and
/// (optionally) portfolio state. `depth` is the top-N to include per side;
/// `imbalance_depth` is the (usually equal, independently configurable) N
/// used for the imbalance metric.
pub fn build_ladder(
    book: &BookReplica,
    pipeline: &MetricPipeline,
    depth: usize,
    imbalance_depth: usize,
    portfolio: Option<PortfolioSnapshot>,
) -> LadderPayload {
    let bids = book.bids().top_descending(depth);
    let asks = book.asks().top_ascending(depth);

    let best_bid = book.best_bid();
    let best_ask = book.best_ask();

    let top_bid_volume = book.bids().top_volume(imbalance_depth, true);
    let top_ask_volume = book.asks().top_volume(imbalance_depth, false);

    let metrics = MetricVector {
        imb: to_f64(imbalance(top_bid_volume, top_ask_volume)),
        spread: to_f64(spread(
            best_bid.map(|(p, _)| p),
            best_ask.map(|(p, _)| p),
        )),
        mid: to_f64(mid(best_bid.map(|(p, _)| p), best_ask.map(|(p, _)| p))),
        micro: to_f64(microprice(best_bid, best_ask)),
        ofi: to_f64(pipeline.ofi()),
        cvd: to_f64(pipeline.cvd()),
    };

    LadderPayload {
        kind: "ladder",
        bids: bids
            .into_iter()
            .map(|(p, q)| (to_f64(p), to_f64(q)))
            .collect(),
        asks: asks
            .into_iter()
            .map(|(p, q)| (to_f64(p), to_f64(q)))
            .collect(),
        metrics,
        portfolio,
    }
}
