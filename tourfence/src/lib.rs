//! Tourfence - location-triggered AR tour engine
//!
//! Turns a stream of noisy GPS fixes into stable positions, decides which
//! points of interest the visitor is inside, emits enter/exit events once
//! per entry and places each point's AR content relative to the visitor.
//!
//! ```text
//! PositionSample ─► position ─► SmoothedPosition ─► geofence ─► GeofenceEvent
//!                                                      │
//!                              poi (catalog) ──────────┤
//!                                                      └─► anchor ─► ResolvedAnchor
//! ```
//!
//! [`session`] ties the stages together and runs them behind a channel.

pub mod anchor;
pub mod config;
pub mod coord;
pub mod geofence;
pub mod logging;
pub mod poi;
pub mod position;
pub mod session;

pub use anchor::{AnchorResolver, ResolvedAnchor, Vector3};
pub use coord::{CoordError, Coordinates};
pub use geofence::{
    CompassDirection, GeofenceEvaluator, GeofenceEvent, GeofenceRadius, GeofenceResult,
    GeofenceStateTracker, HexFace, TrackerState,
};
pub use poi::{ArAnchor, GeofenceShape, PoiCatalog, PointId, PointOfInterest};
pub use position::{
    PositionQuality, PositionSample, PositionSampleFilter, SampleOutcome, SmoothedPosition,
};
pub use session::{
    spawn_session, LocationEvent, SessionConfig, SessionHandle, SessionUpdate, TourSession,
    TrackingStatus,
};
