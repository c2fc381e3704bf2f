//! Microstructure metric functions and the stateful pipeline built on them.

pub mod ladder;
pub mod pipeline;
pub mod pure;

pub use ladder::{build_ladder, LadderPayload, MetricVector};
pub use pipeline::{MetricPipeline, OFI_WINDOW_CAPACITY};
pub use pure::{imbalance, microprice, mid, ofi_step, spread, vpin};
