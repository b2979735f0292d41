//! Geofence geometry, evaluation and state tracking.
//!
//! # Architecture
//!
//! ```text
//! SmoothedPosition ──► GeofenceStateTracker ──► Vec<GeofenceEvent>
//!                          │
//!                          ├── GeofenceEvaluator (per point)
//!                          │       ├── geometry (haversine, hexagon, ray casting)
//!                          │       └── direction (octant, hexagon face)
//!                          └── GeofenceRadius (shared override knob)
//! ```

mod direction;
mod evaluator;
pub mod geometry;
mod radius;
mod tracker;

pub use direction::{bearing_direction, CompassDirection, HexFace};
pub use evaluator::{GeofenceEvaluator, GeofenceResult};
pub use geometry::{
    haversine_distance, hexagon_vertices, local_offset_meters, meters_to_degrees,
    point_in_polygon, EARTH_RADIUS_M, METERS_PER_DEGREE,
};
pub use radius::GeofenceRadius;
pub use tracker::{GeofenceEvent, GeofenceRuntimeState, GeofenceStateTracker, TrackerState};
