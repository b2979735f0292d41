//! Position sample filtering and smoothing.
//!
//! Turns noisy, asynchronous location fixes into a smoothed position with a
//! quality grade and a stability flag.
//!
//! # Pipeline
//!
//! ```text
//! sample ──► validate ──► accuracy gate ──► history (ring) ──► mean ──► SmoothedPosition
//!               │              │                    │
//!               └── Rejected ──┘                    └──► stability window
//! ```
//!
//! Averaging is equal-weight over the whole window; individual fix
//! accuracy only influences the accept/reject decision and the reported
//! quality grade.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::history::{PositionHistory, DEFAULT_CAPACITY};
use super::quality::PositionQuality;
use super::sample::PositionSample;
use crate::coord::{CoordError, Coordinates};
use crate::geofence::haversine_distance;

/// Default worst accuracy accepted (meters).
pub const DEFAULT_MAX_ACCURACY_M: f64 = 50.0;

/// Default maximum drift for a stable position (meters).
pub const DEFAULT_STABILITY_THRESHOLD_M: f64 = 3.0;

/// Default span of history the stability check looks at (milliseconds).
pub const DEFAULT_STABILITY_DURATION_MS: u64 = 8000;

/// Configuration for [`PositionSampleFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Number of samples averaged.
    pub window_size: usize,
    /// Samples with a worse accuracy than this are rejected.
    pub max_accuracy_m: f64,
    /// Maximum pairwise distance within the stability window.
    pub stability_threshold_m: f64,
    /// How far back the stability window reaches.
    pub stability_duration_ms: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_CAPACITY,
            max_accuracy_m: DEFAULT_MAX_ACCURACY_M,
            stability_threshold_m: DEFAULT_STABILITY_THRESHOLD_M,
            stability_duration_ms: DEFAULT_STABILITY_DURATION_MS,
        }
    }
}

/// Best current estimate of the visitor's position.
///
/// Replaced wholesale on every accepted sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothedPosition {
    /// Mean of the buffered sample coordinates.
    pub coordinates: Coordinates,
    /// Mean of the buffered sample accuracies (meters).
    pub accuracy_estimate_m: f64,
    /// Grade of the most recent sample's accuracy.
    pub quality: PositionQuality,
    /// Whether recent samples have stopped drifting.
    pub is_stable: bool,
    /// Timestamp of the sample that produced this estimate.
    pub timestamp_ms: u64,
}

/// Why a sample was dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// Coordinates are NaN, infinite or out of range.
    InvalidCoordinates(CoordError),
    /// Accuracy is NaN, infinite or negative.
    InvalidAccuracy(f64),
    /// Accuracy is worse than the configured maximum.
    AccuracyTooLow { accuracy_m: f64, max_m: f64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidCoordinates(e) => write!(f, "invalid coordinates: {}", e),
            RejectReason::InvalidAccuracy(a) => write!(f, "invalid accuracy: {}", a),
            RejectReason::AccuracyTooLow { accuracy_m, max_m } => {
                write!(f, "accuracy {:.1}m worse than {:.1}m", accuracy_m, max_m)
            }
        }
    }
}

/// Result of ingesting one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Sample was buffered; carries the new smoothed position.
    Accepted(SmoothedPosition),
    /// Sample was dropped; the previous smoothed position still stands.
    Rejected(RejectReason),
}

impl SampleOutcome {
    /// The smoothed position, if the sample was accepted.
    pub fn smoothed(&self) -> Option<&SmoothedPosition> {
        match self {
            SampleOutcome::Accepted(position) => Some(position),
            SampleOutcome::Rejected(_) => None,
        }
    }
}

/// Counters and current state for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionStats {
    /// Samples currently in the averaging window.
    pub samples_in_window: usize,
    /// Total samples accepted this session.
    pub accepted: u64,
    /// Total samples rejected this session.
    pub rejected: u64,
    /// Time between oldest and newest buffered sample.
    pub window_span_ms: Option<u64>,
    /// Accuracy of the most recently accepted sample.
    pub last_accuracy_m: Option<f64>,
    pub quality: Option<PositionQuality>,
    pub is_stable: bool,
}

/// Accepts raw samples and maintains the smoothed position.
///
/// # Example
///
/// ```
/// use tourfence::position::{PositionSample, PositionSampleFilter, SampleOutcome};
///
/// let mut filter = PositionSampleFilter::default();
/// let outcome = filter.ingest(PositionSample::new(-76.9420, 38.9129, 5.0, 0));
/// assert!(matches!(outcome, SampleOutcome::Accepted(_)));
/// ```
#[derive(Debug)]
pub struct PositionSampleFilter {
    config: FilterConfig,
    history: PositionHistory,
    latest: Option<SmoothedPosition>,
    accepted: u64,
    rejected: u64,
}

impl Default for PositionSampleFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl PositionSampleFilter {
    /// Create a filter with the given configuration.
    pub fn new(config: FilterConfig) -> Self {
        Self {
            history: PositionHistory::new(config.window_size),
            config,
            latest: None,
            accepted: 0,
            rejected: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Ingest a raw sample.
    ///
    /// Never fails: invalid or inaccurate samples are reported as
    /// [`SampleOutcome::Rejected`] and leave all state untouched apart from
    /// the rejection counter.
    pub fn ingest(&mut self, sample: PositionSample) -> SampleOutcome {
        if let Err(reason) = self.check(&sample) {
            self.rejected += 1;
            tracing::debug!(
                reason = %reason,
                timestamp_ms = sample.timestamp_ms,
                "Rejected position sample"
            );
            return SampleOutcome::Rejected(reason);
        }

        if let Some(last) = self.history.latest() {
            if sample.timestamp_ms < last.timestamp_ms {
                tracing::warn!(
                    timestamp_ms = sample.timestamp_ms,
                    last_timestamp_ms = last.timestamp_ms,
                    "Out-of-order position sample accepted as-is"
                );
            }
        }

        self.history.push(sample);
        self.accepted += 1;

        let smoothed = self.smooth(&sample);
        self.latest = Some(smoothed);
        SampleOutcome::Accepted(smoothed)
    }

    /// Validate a sample against the acceptance rules.
    fn check(&self, sample: &PositionSample) -> Result<(), RejectReason> {
        sample
            .coordinates
            .validate()
            .map_err(RejectReason::InvalidCoordinates)?;

        let accuracy = sample.accuracy_m;
        if !accuracy.is_finite() || accuracy < 0.0 {
            return Err(RejectReason::InvalidAccuracy(accuracy));
        }
        if accuracy > self.config.max_accuracy_m {
            return Err(RejectReason::AccuracyTooLow {
                accuracy_m: accuracy,
                max_m: self.config.max_accuracy_m,
            });
        }

        Ok(())
    }

    /// Build a smoothed position from the current history.
    fn smooth(&self, current: &PositionSample) -> SmoothedPosition {
        SmoothedPosition {
            coordinates: self
                .history
                .mean_coordinates()
                .unwrap_or(current.coordinates),
            accuracy_estimate_m: self.history.mean_accuracy().unwrap_or(current.accuracy_m),
            quality: PositionQuality::from_accuracy(current.accuracy_m),
            is_stable: self.is_stable(),
            timestamp_ms: current.timestamp_ms,
        }
    }

    /// Whether every pair of samples in the stability window lies within
    /// the stability threshold.
    fn is_stable(&self) -> bool {
        let Some(window) = self.history.covering_window(self.config.stability_duration_ms) else {
            return false;
        };

        let max_drift = window
            .iter()
            .enumerate()
            .flat_map(|(i, a)| {
                window[i + 1..]
                    .iter()
                    .map(move |b| haversine_distance(&a.coordinates, &b.coordinates))
            })
            .fold(0.0_f64, f64::max);

        max_drift <= self.config.stability_threshold_m
    }

    /// The most recent smoothed position, if any sample was accepted.
    pub fn latest(&self) -> Option<&SmoothedPosition> {
        self.latest.as_ref()
    }

    /// Read-only view of the buffered samples.
    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    /// Counters and current state.
    pub fn stats(&self) -> PositionStats {
        PositionStats {
            samples_in_window: self.history.len(),
            accepted: self.accepted,
            rejected: self.rejected,
            window_span_ms: self.history.time_span_ms(),
            last_accuracy_m: self.history.latest().map(|s| s.accuracy_m),
            quality: self.latest.map(|p| p.quality),
            is_stable: self.latest.map(|p| p.is_stable).unwrap_or(false),
        }
    }

    /// Discard all history and counters.
    pub fn reset(&mut self) {
        self.history.clear();
        self.latest = None;
        self.accepted = 0;
        self.rejected = 0;
    }
}
