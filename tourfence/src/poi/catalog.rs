//! Loading the point-of-interest catalog from JSON.
//!
//! The catalog file is a JSON array of [`PointOfInterest`] records.
//! Structural problems (unreadable file, bad JSON, duplicate ids, invalid
//! centers) fail the load. A point with a non-positive radius is kept but
//! logged; the evaluator treats it as never inside so the rest of the tour
//! keeps working.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::PointOfInterest;
use crate::coord::CoordError;

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid JSON for a list of points.
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A point has an empty id.
    #[error("Point at index {0} has an empty id")]
    EmptyId(usize),

    /// Two points share the same id.
    #[error("Duplicate point id '{0}'")]
    DuplicateId(String),

    /// A point's center is outside WGS84 bounds.
    #[error("Point '{id}' has an invalid center: {source}")]
    InvalidCenter {
        id: String,
        #[source]
        source: CoordError,
    },
}

/// Whether a radius can describe a real geofence.
pub(crate) fn is_positive_radius(radius_m: f64) -> bool {
    radius_m.is_finite() && radius_m > 0.0
}

/// Immutable, validated list of points of interest.
#[derive(Debug, Clone, Default)]
pub struct PoiCatalog {
    points: Vec<PointOfInterest>,
}

impl PoiCatalog {
    /// Build a catalog from already constructed points.
    pub fn new(points: Vec<PointOfInterest>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(points.len());

        for (index, point) in points.iter().enumerate() {
            if point.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(index));
            }
            if !seen.insert(point.id.as_str()) {
                return Err(CatalogError::DuplicateId(point.id.clone()));
            }
            point
                .center
                .validate()
                .map_err(|source| CatalogError::InvalidCenter {
                    id: point.id.clone(),
                    source,
                })?;

            if !is_positive_radius(point.radius_m) {
                tracing::warn!(
                    point = %point.id,
                    radius_m = point.radius_m,
                    "Point has no positive radius; it will never be inside"
                );
            }
        }

        tracing::debug!(count = points.len(), "Loaded point-of-interest catalog");
        Ok(Self { points })
    }

    /// Parse a catalog from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let points: Vec<PointOfInterest> = serde_json::from_str(json)?;
        Self::new(points)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// All points, in file order.
    pub fn points(&self) -> &[PointOfInterest] {
        &self.points
    }

    /// Look up a point by id.
    pub fn get(&self, id: &str) -> Option<&PointOfInterest> {
        self.points.iter().find(|p| p.id == id)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the catalog has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
