//! Stateful metric pipeline: rolling OFI window and CVD accumulator.

use std::collections::VecDeque;

use rust_decimal::Decimal;

use crate::book::AppliedDiff;

use super::pure::ofi_step;

/// Bounded ordered sequence of signed per-step OFI contributions.
pub const OFI_WINDOW_CAPACITY: usize = 50;

/// Holds the rolling OFI window and the CVD accumulator. Top-of-book memory
/// itself lives on [`crate::book::BookReplica`]; the pipeline only consumes
/// the before/after pair an applied diff hands it.
#[derive(Debug, Clone)]
pub struct MetricPipeline {
    ofi_window: VecDeque<Decimal>,
    cvd: Decimal,
}

impl Default for MetricPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricPipeline {
    pub fn new() -> Self {
        Self {
            ofi_window: VecDeque::with_capacity(OFI_WINDOW_CAPACITY),
            cvd: Decimal::ZERO,
        }
    }

    /// Computes one OFI contribution from the diff's before/after
    /// top-of-book and pushes it, evicting the oldest entry if at capacity.
    /// Must be called immediately after the `apply_diff` that produced
    /// `applied`, before the next diff is read.
    pub fn on_diff_applied(&mut self, applied: &AppliedDiff) {
        let contribution = ofi_step(
            applied.previous.bid,
            applied.current.bid,
            applied.previous.ask,
            applied.current.ask,
        );
        if self.ofi_window.len() == OFI_WINDOW_CAPACITY {
            self.ofi_window.pop_front();
        }
        self.ofi_window.push_back(contribution);
    }

    /// Updates CVD from an incoming trade: `+qty` if the buyer is the
    /// taker (`buyer_is_maker == false`), `-qty` otherwise.
    pub fn on_trade(&mut self, qty: Decimal, buyer_is_maker: bool) {
        self.cvd += if buyer_is_maker { -qty } else { qty };
    }

    /// Sum of the current OFI window.
    pub fn ofi(&self) -> Decimal {
        self.ofi_window.iter().sum()
    }

    pub fn cvd(&self) -> Decimal {
        self.cvd
    }

    pub fn ofi_window_len(&self) -> usize {
        self.ofi_window.len()
    }

    /// Clears the OFI window and zeroes CVD. A user-visible operation per
    /// the data-model lifecycle, not something triggered by a resync.
    pub fn reset(&mut self) {
        self.ofi_window.clear();
        self.cvd = Decimal::ZERO;
    }
}
