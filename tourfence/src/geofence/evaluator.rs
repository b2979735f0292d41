//! Single-point geofence evaluation.
//!
//! Decides whether a position lies inside one point's geofence and, for
//! direction-sensitive points, which way the visitor was heading when they
//! crossed in. Evaluation is deterministic and has no side effects beyond
//! logging, so independent points can be evaluated in any order.

use serde::{Deserialize, Serialize};

use super::direction::{bearing_direction, CompassDirection, HexFace};
use super::geometry::{haversine_distance, hexagon_vertices, meters_to_degrees, point_in_polygon};
use super::radius::GeofenceRadius;
use crate::coord::Coordinates;
use crate::poi::{is_positive_radius, GeofenceShape, PointId, PointOfInterest};

/// Outcome of evaluating one point for one position.
///
/// Recomputed every cycle; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceResult {
    pub point_id: PointId,
    /// Great-circle distance from the position to the point's center.
    pub distance_m: f64,
    pub is_inside: bool,
    pub shape: GeofenceShape,
    /// Radius that was applied (override or configured).
    pub radius_m: f64,
    /// Heading of travel at entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_direction: Option<CompassDirection>,
    /// Hexagon face crossed at entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_face: Option<HexFace>,
    /// Message configured for the entry heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_message: Option<String>,
}

/// Evaluates points against positions using the shared radius knob.
#[derive(Debug, Clone, Default)]
pub struct GeofenceEvaluator {
    radius: GeofenceRadius,
}

impl GeofenceEvaluator {
    /// Create an evaluator reading the given radius knob.
    pub fn new(radius: GeofenceRadius) -> Self {
        Self { radius }
    }

    /// The radius knob this evaluator reads.
    pub fn radius(&self) -> &GeofenceRadius {
        &self.radius
    }

    /// Evaluate `point` for the `current` position.
    ///
    /// `previous` is the position from the prior cycle; entry direction is
    /// only computed when it is present, the point is direction sensitive
    /// and the current position is inside.
    pub fn evaluate(
        &self,
        point: &PointOfInterest,
        current: &Coordinates,
        previous: Option<&Coordinates>,
    ) -> GeofenceResult {
        let distance_m = haversine_distance(current, &point.center);
        let radius_m = self.radius.effective_for(point);

        // A misconfigured point stays out even when an override is active
        let is_inside = if is_positive_radius(point.radius_m) && is_positive_radius(radius_m) {
            match point.shape {
                GeofenceShape::Circle => distance_m <= radius_m,
                GeofenceShape::Hexagon => {
                    let vertices = hexagon_vertices(&point.center, meters_to_degrees(radius_m));
                    point_in_polygon(current, &vertices)
                }
            }
        } else {
            false
        };

        let mut result = GeofenceResult {
            point_id: point.id.clone(),
            distance_m,
            is_inside,
            shape: point.shape,
            radius_m,
            entry_direction: None,
            entry_face: None,
            entry_message: None,
        };

        if is_inside && point.direction_sensitive {
            if let Some(direction) = bearing_direction(previous, current) {
                result.entry_direction = Some(direction);
                result.entry_face = Some(direction.hex_face());
                result.entry_message = point.entry_message(direction).map(str::to_owned);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus_point(shape: GeofenceShape, radius_m: f64) -> PointOfInterest {
        PointOfInterest::new(
            "chapel",
            "Memorial Chapel",
            Coordinates::new(-76.94177, 38.913078),
            shape,
            radius_m,
        )
    }

    fn user() -> Coordinates {
        Coordinates::new(-76.9420, 38.9129)
    }

    #[test]
    fn test_circle_outside_then_inside_after_radius_change() {
        let radius = GeofenceRadius::new();
        let evaluator = GeofenceEvaluator::new(radius.clone());
        let point = campus_point(GeofenceShape::Circle, 15.0);

        let result = evaluator.evaluate(&point, &user(), None);
        assert!(!result.is_inside);
        assert_eq!(result.radius_m, 15.0);

        radius.set(30);
        let result = evaluator.evaluate(&point, &user(), None);
        assert!(result.is_inside);
        assert_eq!(result.radius_m, 30.0);
    }

    #[test]
    fn test_circle_boundary_is_inside() {
        let evaluator = GeofenceEvaluator::default();
        let mut point = campus_point(GeofenceShape::Circle, 1.0);
        point.radius_m = haversine_distance(&user(), &point.center);

        assert!(evaluator.evaluate(&point, &user(), None).is_inside);
    }

    #[test]
    fn test_distance_always_reported() {
        let evaluator = GeofenceEvaluator::default();
        let point = campus_point(GeofenceShape::Circle, 15.0);
        let result = evaluator.evaluate(&point, &user(), None);
        assert!((result.distance_m - haversine_distance(&user(), &point.center)).abs() < 1e-12);
    }

    #[test]
    fn test_hexagon_containment() {
        let evaluator = GeofenceEvaluator::default();
        let point = campus_point(GeofenceShape::Hexagon, 50.0);

        assert!(evaluator.evaluate(&point, &point.center, None).is_inside);
        assert!(evaluator.evaluate(&point, &user(), None).is_inside);

        let far = Coordinates::new(-76.9500, 38.9200);
        assert!(!evaluator.evaluate(&point, &far, None).is_inside);
    }

    #[test]
    fn test_non_positive_radius_is_never_inside() {
        let evaluator = GeofenceEvaluator::default();
        for shape in [GeofenceShape::Circle, GeofenceShape::Hexagon] {
            let point = campus_point(shape, 0.0);
            let result = evaluator.evaluate(&point, &point.center, None);
            assert!(!result.is_inside);
            assert_eq!(result.distance_m, 0.0);

            let point = campus_point(shape, f64::NAN);
            assert!(!evaluator.evaluate(&point, &point.center, None).is_inside);
        }
    }

    #[test]
    fn test_override_does_not_revive_misconfigured_point() {
        let evaluator = GeofenceEvaluator::new(GeofenceRadius::with_override(30));
        for radius_m in [0.0, -5.0, f64::NAN] {
            let point = campus_point(GeofenceShape::Circle, radius_m);
            let result = evaluator.evaluate(&point, &point.center, None);
            assert!(!result.is_inside, "radius {} should never be inside", radius_m);
        }

        let healthy = campus_point(GeofenceShape::Circle, 15.0);
        assert!(evaluator.evaluate(&healthy, &user(), None).is_inside);
    }

    #[test]
    fn test_direction_attached_when_sensitive() {
        let evaluator = GeofenceEvaluator::default();
        let point = campus_point(GeofenceShape::Hexagon, 40.0)
            .with_direction_sensitive(true)
            .with_entry_message(CompassDirection::NorthEast, "Approaching from the parking lot");

        let previous = Coordinates::new(-76.9424, 38.9126);
        let result = evaluator.evaluate(&point, &user(), Some(&previous));

        assert!(result.is_inside);
        assert_eq!(result.entry_direction, Some(CompassDirection::NorthEast));
        assert_eq!(result.entry_face, Some(HexFace::SouthWest));
        assert_eq!(
            result.entry_message.as_deref(),
            Some("Approaching from the parking lot")
        );
    }

    #[test]
    fn test_missing_message_is_not_an_error() {
        let evaluator = GeofenceEvaluator::default();
        let point = campus_point(GeofenceShape::Circle, 40.0).with_direction_sensitive(true);

        let previous = Coordinates::new(-76.9424, 38.9126);
        let result = evaluator.evaluate(&point, &user(), Some(&previous));

        assert_eq!(result.entry_direction, Some(CompassDirection::NorthEast));
        assert!(result.entry_message.is_none());
    }

    #[test]
    fn test_no_direction_without_previous_or_sensitivity() {
        let evaluator = GeofenceEvaluator::default();
        let previous = Coordinates::new(-76.9424, 38.9126);

        let sensitive = campus_point(GeofenceShape::Circle, 40.0).with_direction_sensitive(true);
        assert!(evaluator
            .evaluate(&sensitive, &user(), None)
            .entry_direction
            .is_none());

        let insensitive = campus_point(GeofenceShape::Circle, 40.0);
        assert!(evaluator
            .evaluate(&insensitive, &user(), Some(&previous))
            .entry_direction
            .is_none());
    }

    #[test]
    fn test_no_direction_when_outside() {
        let evaluator = GeofenceEvaluator::default();
        let point = campus_point(GeofenceShape::Circle, 5.0).with_direction_sensitive(true);
        let previous = Coordinates::new(-76.9424, 38.9126);

        let result = evaluator.evaluate(&point, &user(), Some(&previous));
        assert!(!result.is_inside);
        assert!(result.entry_direction.is_none());
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_circle_containment_matches_distance(
                dlon in -0.001..0.001_f64,
                dlat in -0.001..0.001_f64,
                radius in 1.0..150.0_f64,
            ) {
                let evaluator = GeofenceEvaluator::default();
                let point = campus_point(GeofenceShape::Circle, radius);
                let position = Coordinates::new(
                    point.center.longitude + dlon,
                    point.center.latitude + dlat,
                );

                let result = evaluator.evaluate(&point, &position, None);
                let expected = haversine_distance(&position, &point.center) <= radius;
                prop_assert_eq!(result.is_inside, expected);
            }
        }
    }
}
