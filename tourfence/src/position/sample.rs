//! Raw location samples as delivered by the host's location service.

use serde::{Deserialize, Serialize};

use crate::coord::Coordinates;

/// A single raw location fix.
///
/// Immutable once created. Timestamps are milliseconds on the host clock;
/// only differences between samples are meaningful to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Reported position.
    pub coordinates: Coordinates,
    /// Horizontal accuracy radius reported by the source (meters).
    pub accuracy_m: f64,
    /// When the fix was taken (milliseconds).
    pub timestamp_ms: u64,
}

impl PositionSample {
    /// Create a new sample from raw values.
    pub fn new(longitude: f64, latitude: f64, accuracy_m: f64, timestamp_ms: u64) -> Self {
        Self {
            coordinates: Coordinates::new(longitude, latitude),
            accuracy_m,
            timestamp_ms,
        }
    }

    /// Create a sample from existing coordinates.
    pub fn at(coordinates: Coordinates, accuracy_m: f64, timestamp_ms: u64) -> Self {
        Self {
            coordinates,
            accuracy_m,
            timestamp_ms,
        }
    }
}
