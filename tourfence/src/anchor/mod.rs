//! AR anchor placement.
//!
//! Converts a point's GPS anchor into a local offset from the visitor,
//! suitable for placing content in an AR scene. Anchors with a destination
//! travel between the two coordinates along an eased path.
//!
//! # Local frame
//!
//! ```text
//!        y (up, elevation)
//!        │
//!        │
//!        └──── x (east)
//!       ╱
//!      z (south; north is -z)
//! ```
//!
//! The frame is right-handed and y-up, matching common rendering engines.
//! Planar offsets come from [`crate::geofence::local_offset_meters`].

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::coord::Coordinates;
use crate::geofence::local_offset_meters;
use crate::poi::{PointId, PointOfInterest};

/// A position in the local AR frame (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal distance from the origin.
    pub fn planar_length(&self) -> f64 {
        self.x.hypot(self.z)
    }
}

/// Placement of a point's AR content relative to the visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAnchor {
    pub point_id: PointId,
    /// Offset from the visitor in the local frame.
    pub local_position: Vector3,
    /// Geographic position the offset was computed for.
    pub coordinates: Coordinates,
    pub elevation_m: f64,
    pub orientation_deg: f64,
    pub scale: f64,
    /// Eased travel fraction applied, for anchors with a destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel: Option<f64>,
}

/// Cosine half-wave easing: slow start, slow finish.
///
/// Input is clamped to [0, 1].
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    (1.0 - (PI * t).cos()) / 2.0
}

/// Fraction of a travel animation completed after `elapsed_ms`.
///
/// A zero duration counts as already complete.
pub fn travel_progress(elapsed_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 1.0;
    }
    (elapsed_ms as f64 / duration_ms as f64).min(1.0)
}

/// Linear interpolation between two coordinates.
fn lerp(from: &Coordinates, to: &Coordinates, t: f64) -> Coordinates {
    Coordinates::new(
        from.longitude + (to.longitude - from.longitude) * t,
        from.latitude + (to.latitude - from.latitude) * t,
    )
}

/// Resolves AR anchors against the visitor's position.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorResolver;

impl AnchorResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `point`'s anchor relative to `user`.
    ///
    /// `progress` is the travel fraction in [0, 1] for anchors with a
    /// destination; out-of-range values are clamped, non-finite values are
    /// ignored. It has no effect on anchors without a destination.
    ///
    /// # Returns
    ///
    /// `None` when the point has no AR content.
    pub fn resolve(
        &self,
        point: &PointOfInterest,
        user: &Coordinates,
        progress: Option<f64>,
    ) -> Option<ResolvedAnchor> {
        let anchor = point.ar_anchor.as_ref()?;

        let progress = progress.filter(|p| {
            let finite = p.is_finite();
            if !finite {
                tracing::warn!(point = %point.id, progress = p, "Ignoring non-finite travel progress");
            }
            finite
        });

        let (coordinates, travel) = match (anchor.destination.as_ref(), progress) {
            (Some(destination), Some(p)) => {
                let eased = ease_in_out(p);
                (lerp(&anchor.coordinates, destination, eased), Some(eased))
            }
            _ => (anchor.coordinates, None),
        };

        let (east, north) = local_offset_meters(user, &coordinates);

        Some(ResolvedAnchor {
            point_id: point.id.clone(),
            local_position: Vector3::new(east, anchor.elevation_m, -north),
            coordinates,
            elevation_m: anchor.elevation_m,
            orientation_deg: anchor.orientation_deg,
            scale: anchor.scale,
            travel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geofence::METERS_PER_DEGREE;
    use crate::poi::{ArAnchor, GeofenceShape};

    const TOLERANCE: f64 = 1e-6;

    fn point_with(anchor: Option<ArAnchor>) -> PointOfInterest {
        let mut point = PointOfInterest::new(
            "statue",
            "Testudo",
            Coordinates::new(0.0, 0.0),
            GeofenceShape::Circle,
            15.0,
        );
        point.ar_anchor = anchor;
        point
    }

    #[test]
    fn test_no_anchor_resolves_to_none() {
        let resolver = AnchorResolver::new();
        let point = point_with(None);
        assert!(resolver.resolve(&point, &Coordinates::new(0.0, 0.0), None).is_none());
    }

    #[test]
    fn test_anchor_north_of_user() {
        let resolver = AnchorResolver::new();
        let anchor = ArAnchor::at(Coordinates::new(0.0, 10.0 / METERS_PER_DEGREE))
            .with_elevation(1.5)
            .with_orientation(45.0)
            .with_scale(2.0);
        let point = point_with(Some(anchor));

        let resolved = resolver
            .resolve(&point, &Coordinates::new(0.0, 0.0), None)
            .unwrap();

        assert!(resolved.local_position.x.abs() < TOLERANCE);
        assert!((resolved.local_position.y - 1.5).abs() < TOLERANCE);
        assert!((resolved.local_position.z + 10.0).abs() < TOLERANCE);
        assert_eq!(resolved.orientation_deg, 45.0);
        assert_eq!(resolved.scale, 2.0);
        assert!(resolved.travel.is_none());
    }

    #[test]
    fn test_anchor_east_of_user() {
        let resolver = AnchorResolver::new();
        let anchor = ArAnchor::at(Coordinates::new(20.0 / METERS_PER_DEGREE, 0.0));
        let point = point_with(Some(anchor));

        let resolved = resolver
            .resolve(&point, &Coordinates::new(0.0, 0.0), None)
            .unwrap();
        assert!((resolved.local_position.x - 20.0).abs() < TOLERANCE);
        assert!(resolved.local_position.z.abs() < TOLERANCE);
        assert!((resolved.local_position.planar_length() - 20.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_travel_endpoints_and_midpoint() {
        let resolver = AnchorResolver::new();
        let start = Coordinates::new(0.0, 0.0);
        let end = Coordinates::new(0.0, 100.0 / METERS_PER_DEGREE);
        let point = point_with(Some(ArAnchor::at(start).with_destination(end)));
        let user = Coordinates::new(0.0, 0.0);

        let at_start = resolver.resolve(&point, &user, Some(0.0)).unwrap();
        assert!(at_start.local_position.z.abs() < TOLERANCE);

        let at_end = resolver.resolve(&point, &user, Some(1.0)).unwrap();
        assert!((at_end.local_position.z + 100.0).abs() < TOLERANCE);

        let midway = resolver.resolve(&point, &user, Some(0.5)).unwrap();
        assert!((midway.local_position.z + 50.0).abs() < TOLERANCE);
        assert!((midway.travel.unwrap() - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_travel_is_eased() {
        let resolver = AnchorResolver::new();
        let start = Coordinates::new(0.0, 0.0);
        let end = Coordinates::new(0.0, 100.0 / METERS_PER_DEGREE);
        let point = point_with(Some(ArAnchor::at(start).with_destination(end)));

        let quarter = resolver
            .resolve(&point, &Coordinates::new(0.0, 0.0), Some(0.25))
            .unwrap();
        // Eased position lags the linear 25m early in the trip
        let travelled = -quarter.local_position.z;
        assert!(travelled < 25.0 && travelled > 0.0, "got {}", travelled);
    }

    #[test]
    fn test_progress_clamped_and_non_finite_ignored() {
        let resolver = AnchorResolver::new();
        let start = Coordinates::new(0.0, 0.0);
        let end = Coordinates::new(0.0, 100.0 / METERS_PER_DEGREE);
        let point = point_with(Some(ArAnchor::at(start).with_destination(end)));
        let user = Coordinates::new(0.0, 0.0);

        let beyond = resolver.resolve(&point, &user, Some(3.0)).unwrap();
        assert!((beyond.local_position.z + 100.0).abs() < TOLERANCE);

        let nan = resolver.resolve(&point, &user, Some(f64::NAN)).unwrap();
        assert!(nan.local_position.z.abs() < TOLERANCE);
        assert!(nan.travel.is_none());
    }

    #[test]
    fn test_progress_ignored_without_destination() {
        let resolver = AnchorResolver::new();
        let point = point_with(Some(ArAnchor::at(Coordinates::new(0.0, 0.0))));
        let resolved = resolver
            .resolve(&point, &Coordinates::new(0.0, 0.0), Some(0.7))
            .unwrap();
        assert!(resolved.travel.is_none());
    }

    #[test]
    fn test_ease_in_out_shape() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert!((ease_in_out(1.0) - 1.0).abs() < 1e-12);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!(ease_in_out(0.1) < 0.1);
        assert!(ease_in_out(0.9) > 0.9);
    }

    #[test]
    fn test_travel_progress() {
        assert_eq!(travel_progress(0, 10_000), 0.0);
        assert_eq!(travel_progress(5000, 10_000), 0.5);
        assert_eq!(travel_progress(20_000, 10_000), 1.0);
        assert_eq!(travel_progress(5, 0), 1.0);
    }
}
