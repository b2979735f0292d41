//! Point-of-interest configuration.
//!
//! Points are static tour configuration: loaded once at startup and
//! read-only for the rest of the process.

mod catalog;

pub use catalog::{CatalogError, PoiCatalog};
pub(crate) use catalog::is_positive_radius;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::Coordinates;
use crate::geofence::CompassDirection;

/// Identifier of a point of interest.
pub type PointId = String;

/// Boundary shape of a point's geofence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceShape {
    #[default]
    Circle,
    Hexagon,
}

impl fmt::Display for GeofenceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeofenceShape::Circle => write!(f, "circle"),
            GeofenceShape::Hexagon => write!(f, "hexagon"),
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

/// Real-world placement of a point's AR content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArAnchor {
    /// Where the content is anchored.
    pub coordinates: Coordinates,
    /// Second anchor for content that travels; interpolated towards over time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Coordinates>,
    /// Height above the ground plane (meters).
    #[serde(default)]
    pub elevation_m: f64,
    /// Heading of the content around the vertical axis (degrees).
    #[serde(default)]
    pub orientation_deg: f64,
    /// Uniform scale factor.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl ArAnchor {
    /// Anchor fixed at `coordinates` with neutral elevation, orientation and scale.
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            destination: None,
            elevation_m: 0.0,
            orientation_deg: 0.0,
            scale: 1.0,
        }
    }

    /// Set a travel destination.
    pub fn with_destination(mut self, destination: Coordinates) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Set the elevation.
    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = elevation_m;
        self
    }

    /// Set the orientation.
    pub fn with_orientation(mut self, orientation_deg: f64) -> Self {
        self.orientation_deg = orientation_deg;
        self
    }

    /// Set the scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// A tour stop with its geofence and optional AR content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: PointId,
    pub title: String,
    /// Geofence center.
    pub center: Coordinates,
    /// Geofence boundary shape.
    #[serde(default)]
    pub shape: GeofenceShape,
    /// Configured radius in meters; replaced by a runtime override when set.
    pub radius_m: f64,
    /// Whether entry direction is computed and messages selected by it.
    #[serde(default)]
    pub direction_sensitive: bool,
    /// Message shown when entering while travelling on a given heading.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entry_messages: BTreeMap<CompassDirection, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar_anchor: Option<ArAnchor>,
}

impl PointOfInterest {
    /// Create a point with no direction handling and no AR content.
    pub fn new(
        id: impl Into<PointId>,
        title: impl Into<String>,
        center: Coordinates,
        shape: GeofenceShape,
        radius_m: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            center,
            shape,
            radius_m,
            direction_sensitive: false,
            entry_messages: BTreeMap::new(),
            ar_anchor: None,
        }
    }

    /// Enable direction-sensitive entry.
    pub fn with_direction_sensitive(mut self, sensitive: bool) -> Self {
        self.direction_sensitive = sensitive;
        self
    }

    /// Add an entry message for a heading.
    pub fn with_entry_message(
        mut self,
        direction: CompassDirection,
        message: impl Into<String>,
    ) -> Self {
        self.entry_messages.insert(direction, message.into());
        self
    }

    /// Attach AR content.
    pub fn with_anchor(mut self, anchor: ArAnchor) -> Self {
        self.ar_anchor = Some(anchor);
        self
    }

    /// Entry message configured for `direction`, if any.
    pub fn entry_message(&self, direction: CompassDirection) -> Option<&str> {
        self.entry_messages.get(&direction).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_point() {
        let json = r#"{
            "id": "chapel",
            "title": "Memorial Chapel",
            "center": [-76.94177, 38.913078],
            "radius_m": 15
        }"#;

        let point: PointOfInterest = serde_json::from_str(json).unwrap();
        assert_eq!(point.id, "chapel");
        assert_eq!(point.shape, GeofenceShape::Circle);
        assert_eq!(point.radius_m, 15.0);
        assert!(!point.direction_sensitive);
        assert!(point.entry_messages.is_empty());
        assert!(point.ar_anchor.is_none());
    }

    #[test]
    fn test_deserialize_full_point() {
        let json = r#"{
            "id": "mall",
            "title": "McKeldin Mall",
            "center": [-76.9440, 38.9860],
            "shape": "hexagon",
            "radius_m": 20,
            "direction_sensitive": true,
            "entry_messages": { "N": "Welcome from the south lawn", "W": "Welcome from the library" },
            "ar_anchor": {
                "coordinates": [-76.9441, 38.9861],
                "destination": [-76.9438, 38.9863],
                "elevation_m": 2.5,
                "orientation_deg": 90
            }
        }"#;

        let point: PointOfInterest = serde_json::from_str(json).unwrap();
        assert_eq!(point.shape, GeofenceShape::Hexagon);
        assert!(point.direction_sensitive);
        assert_eq!(
            point.entry_message(CompassDirection::North),
            Some("Welcome from the south lawn")
        );
        assert!(point.entry_message(CompassDirection::East).is_none());

        let anchor = point.ar_anchor.unwrap();
        assert!(anchor.destination.is_some());
        assert_eq!(anchor.elevation_m, 2.5);
        assert_eq!(anchor.scale, 1.0);
    }

    #[test]
    fn test_builder() {
        let point = PointOfInterest::new(
            "p1",
            "Point 1",
            Coordinates::new(1.0, 2.0),
            GeofenceShape::Hexagon,
            10.0,
        )
        .with_direction_sensitive(true)
        .with_entry_message(CompassDirection::South, "hello")
        .with_anchor(ArAnchor::at(Coordinates::new(1.0, 2.0)).with_scale(2.0));

        assert!(point.direction_sensitive);
        assert_eq!(point.entry_message(CompassDirection::South), Some("hello"));
        assert_eq!(point.ar_anchor.unwrap().scale, 2.0);
    }
}
