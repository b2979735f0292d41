//! Position sample filtering.
//!
//! Raw fixes from the host's location service enter through
//! [`PositionSampleFilter::ingest`], which drops unusable samples and keeps
//! a bounded [`PositionHistory`] from which the [`SmoothedPosition`] is
//! derived.

mod filter;
mod history;
mod quality;
mod sample;

pub use filter::{
    FilterConfig, PositionSampleFilter, PositionStats, RejectReason, SampleOutcome,
    SmoothedPosition, DEFAULT_MAX_ACCURACY_M, DEFAULT_STABILITY_DURATION_MS,
    DEFAULT_STABILITY_THRESHOLD_M,
};
pub use history::{PositionHistory, DEFAULT_CAPACITY};
pub use quality::PositionQuality;
pub use sample::PositionSample;
