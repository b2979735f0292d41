//! Geographic coordinate types.
//!
//! Provides the WGS84 longitude/latitude pair shared by every engine
//! component, plus validation of raw values arriving from the host's
//! location service.
//!
//! Coordinates are stored in GeoJSON order (longitude first) and serialize
//! as a two-element array, e.g. `[-76.94177, 38.913078]`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors produced when validating raw coordinate values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is NaN, infinite or outside [-90, 90].
    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude is NaN, infinite or outside [-180, 180].
    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),
}

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    /// Longitude in degrees (east positive).
    pub longitude: f64,
    /// Latitude in degrees (north positive).
    pub latitude: f64,
}

impl Coordinates {
    /// Create coordinates without validation.
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Create coordinates, rejecting non-finite or out-of-range values.
    ///
    /// # Returns
    ///
    /// `Err(CoordError)` naming the first offending axis (latitude is
    /// checked before longitude).
    pub fn try_new(longitude: f64, latitude: f64) -> Result<Self, CoordError> {
        let coords = Self::new(longitude, latitude);
        coords.validate()?;
        Ok(coords)
    }

    /// Check that both axes are finite and within WGS84 bounds.
    pub fn validate(&self) -> Result<(), CoordError> {
        // RangeInclusive::contains is false for NaN, so this also rejects NaN
        if !(MIN_LAT..=MAX_LAT).contains(&self.latitude) {
            return Err(CoordError::InvalidLatitude(self.latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&self.longitude) {
            return Err(CoordError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }

    /// Whether [`Self::validate`] succeeds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coords: Coordinates) -> Self {
        [coords.longitude, coords.latitude]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.longitude, self.latitude)
    }
}
