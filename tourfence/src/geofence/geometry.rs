//! Pure geometry for geofence evaluation.
//!
//! Every flat-earth approximation used by the engine lives here so it can
//! be swapped for a projected coordinate system without touching callers.
//!
//! # Conventions
//!
//! - Planar math treats longitude as x and latitude as y
//! - Degree/meter conversion uses a fixed 111,320 m per degree; hexagon
//!   radii are not scaled by latitude, local offsets scale longitude by
//!   `cos(latitude)`

use crate::coord::Coordinates;

/// Mean Earth radius used by the haversine formula (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Fixed meters-per-degree approximation.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Number of hexagon vertices.
pub const HEXAGON_SIDES: usize = 6;

/// Great-circle distance between two points in meters.
///
/// Symmetric, and exactly zero for identical inputs.
pub fn haversine_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h just past 1 near antipodes
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Convert a distance in meters to degrees using the fixed approximation.
#[inline]
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Planar offset from `origin` to `target` in meters, as `(east, north)`.
///
/// Longitude deltas are scaled by the cosine of the origin's latitude.
pub fn local_offset_meters(origin: &Coordinates, target: &Coordinates) -> (f64, f64) {
    let east = (target.longitude - origin.longitude)
        * METERS_PER_DEGREE
        * origin.latitude.to_radians().cos();
    let north = (target.latitude - origin.latitude) * METERS_PER_DEGREE;
    (east, north)
}

/// Vertices of a regular hexagon around `center`.
///
/// Vertex `i` sits at angle `θᵢ = (i·60 − 90)°` in the lon/lat plane, so the
/// ring has one vertex on each of the north and south axes and flat faces
/// to the east and west.
pub fn hexagon_vertices(center: &Coordinates, radius_deg: f64) -> [Coordinates; HEXAGON_SIDES] {
    std::array::from_fn(|i| {
        let theta = (i as f64 * 60.0 - 90.0).to_radians();
        Coordinates::new(
            center.longitude + radius_deg * theta.cos(),
            center.latitude + radius_deg * theta.sin(),
        )
    })
}

/// Even-odd ray casting containment test over an ordered vertex ring.
///
/// Rings with fewer than three vertices contain nothing.
pub fn point_in_polygon(point: &Coordinates, vertices: &[Coordinates]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut j = vertices.len() - 1;

    for i in 0..vertices.len() {
        let (xi, yi) = (vertices[i].longitude, vertices[i].latitude);
        let (xj, yj) = (vertices[j].longitude, vertices[j].latitude);

        // Edge straddles the horizontal ray and the crossing lies to the right
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}
