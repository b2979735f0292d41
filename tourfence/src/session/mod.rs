//! Tracking sessions.
//!
//! A session owns everything that lives from "start tracking" to "stop
//! tracking": the position history, the geofence runtime state and the
//! tracking health. Point configuration and the radius knob outlive it.
//!
//! # Data flow
//!
//! ```text
//! LocationEvent ──► TourSession::handle
//!                      ├── PositionSampleFilter  (reject / smooth)
//!                      ├── GeofenceStateTracker  (enter / exit)
//!                      └── SessionUpdate ──► consumers
//!                                              └── AnchorResolver (on demand)
//! ```
//!
//! [`spawn_session`] runs a session behind a bounded channel so events are
//! processed one at a time, in arrival order.

mod runner;

pub use runner::{spawn_session, SessionError, SessionHandle};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::anchor::{AnchorResolver, ResolvedAnchor};
use crate::geofence::{GeofenceEvent, GeofenceRadius, GeofenceStateTracker, TrackerState};
use crate::poi::{PoiCatalog, PointId};
use crate::position::{
    FilterConfig, PositionSample, PositionSampleFilter, PositionStats, RejectReason,
    SampleOutcome, SmoothedPosition,
};

/// Default capacity of the session input channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for a tracking session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Sample filter settings.
    pub filter: FilterConfig,
    /// Bound of the input and output channels used by [`spawn_session`].
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Input delivered by the host's location service.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// A new location fix.
    Sample(PositionSample),
    /// The source failed (permission revoked, timeout, hardware error).
    Unavailable(String),
}

/// Health of the location feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TrackingStatus {
    /// Samples are arriving.
    #[default]
    Healthy,
    /// The source reported a failure; last known state is retained.
    Degraded { reason: String },
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingStatus::Healthy => write!(f, "healthy"),
            TrackingStatus::Degraded { reason } => write!(f, "degraded ({})", reason),
        }
    }
}

/// What handling one [`LocationEvent`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// A sample was accepted and geofences re-evaluated.
    Positioned {
        position: SmoothedPosition,
        events: Vec<GeofenceEvent>,
        /// Whether this sample ended a degraded period.
        recovered: bool,
    },
    /// A sample was dropped; nothing else changed.
    Rejected(RejectReason),
    /// The location source reported a failure.
    Degraded { reason: String },
}

/// Point-in-time copy of a session's query surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub position: Option<SmoothedPosition>,
    pub stats: PositionStats,
    pub status: TrackingStatus,
    pub state: TrackerState,
    /// Active points in catalog order.
    pub active_ids: Vec<PointId>,
    /// Distance to every point from the latest position.
    pub distances: HashMap<PointId, f64>,
    pub radius_override_m: Option<u32>,
}

impl SessionSnapshot {
    /// Whether the latest position is inside point `id`.
    pub fn is_inside_geofence(&self, id: &str) -> bool {
        self.active_ids.iter().any(|active| active == id)
    }

    /// Distance from the latest position to point `id`.
    pub fn distance_to_point(&self, id: &str) -> Option<f64> {
        self.distances.get(id).copied()
    }

    /// Active radius override, if any.
    pub fn current_radius(&self) -> Option<u32> {
        self.radius_override_m
    }
}

/// One tracking session: filter, tracker and anchor resolution.
#[derive(Debug)]
pub struct TourSession {
    filter: PositionSampleFilter,
    tracker: GeofenceStateTracker,
    resolver: AnchorResolver,
    status: TrackingStatus,
}

impl TourSession {
    /// Start a session over `catalog`.
    pub fn new(catalog: Arc<PoiCatalog>, config: &SessionConfig, radius: GeofenceRadius) -> Self {
        tracing::info!(points = catalog.len(), "Tracking session started");
        Self {
            filter: PositionSampleFilter::new(config.filter.clone()),
            tracker: GeofenceStateTracker::new(catalog, radius),
            resolver: AnchorResolver::new(),
            status: TrackingStatus::Healthy,
        }
    }

    /// Process one location event to completion.
    pub fn handle(&mut self, event: LocationEvent) -> SessionUpdate {
        match event {
            LocationEvent::Sample(sample) => self.ingest(sample),
            LocationEvent::Unavailable(reason) => self.report_unavailable(reason),
        }
    }

    /// Filter a sample and, if accepted, re-evaluate every geofence.
    pub fn ingest(&mut self, sample: PositionSample) -> SessionUpdate {
        match self.filter.ingest(sample) {
            SampleOutcome::Accepted(position) => {
                let recovered = matches!(self.status, TrackingStatus::Degraded { .. });
                if recovered {
                    tracing::info!("Location feed recovered");
                    self.status = TrackingStatus::Healthy;
                }

                let events = self.tracker.update(&position);
                SessionUpdate::Positioned {
                    position,
                    events,
                    recovered,
                }
            }
            SampleOutcome::Rejected(reason) => SessionUpdate::Rejected(reason),
        }
    }

    /// Record a location source failure.
    ///
    /// The smoothed position and geofence state are kept as they were.
    pub fn report_unavailable(&mut self, reason: String) -> SessionUpdate {
        tracing::warn!(reason = %reason, "Location unavailable, tracking degraded");
        self.status = TrackingStatus::Degraded {
            reason: reason.clone(),
        };
        SessionUpdate::Degraded { reason }
    }

    /// Health of the location feed.
    pub fn status(&self) -> &TrackingStatus {
        &self.status
    }

    /// Latest smoothed position.
    pub fn smoothed_position(&self) -> Option<&SmoothedPosition> {
        self.filter.latest()
    }

    /// Filter counters and state.
    pub fn position_stats(&self) -> PositionStats {
        self.filter.stats()
    }

    pub fn is_inside_geofence(&self, id: &str) -> bool {
        self.tracker.is_inside(id)
    }

    pub fn distance_to_point(&self, id: &str) -> Option<f64> {
        self.tracker.distance_to(id)
    }

    pub fn current_radius(&self) -> Option<u32> {
        self.tracker.current_radius()
    }

    /// The underlying geofence tracker.
    pub fn tracker(&self) -> &GeofenceStateTracker {
        &self.tracker
    }

    /// Resolve the AR anchor of point `id` against the latest position.
    ///
    /// `None` if there is no position yet, the point is unknown or it has
    /// no AR content.
    pub fn resolve_anchor(&self, id: &str, progress: Option<f64>) -> Option<ResolvedAnchor> {
        let user = self.filter.latest()?.coordinates;
        let point = self.tracker.catalog().get(id)?;
        self.resolver.resolve(point, &user, progress)
    }

    /// Resolve anchors for every active point that has AR content.
    pub fn resolve_active_anchors(&self, progress: Option<f64>) -> Vec<ResolvedAnchor> {
        self.tracker
            .active_ids()
            .iter()
            .filter_map(|id| self.resolve_anchor(id, progress))
            .collect()
    }

    /// Copy of the query surface for sharing across threads.
    pub fn snapshot(&self) -> SessionSnapshot {
        let distances = self
            .tracker
            .catalog()
            .points()
            .iter()
            .filter_map(|p| self.tracker.distance_to(&p.id).map(|d| (p.id.clone(), d)))
            .collect();

        SessionSnapshot {
            position: self.filter.latest().copied(),
            stats: self.filter.stats(),
            status: self.status.clone(),
            state: self.tracker.state(),
            active_ids: self.tracker.active_ids(),
            distances,
            radius_override_m: self.tracker.current_radius(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinates;
    use crate::poi::{ArAnchor, GeofenceShape, PointOfInterest};

    fn catalog() -> Arc<PoiCatalog> {
        let chapel = PointOfInterest::new(
            "chapel",
            "Memorial Chapel",
            Coordinates::new(-76.94177, 38.913078),
            GeofenceShape::Circle,
            15.0,
        )
        .with_anchor(ArAnchor::at(Coordinates::new(-76.94177, 38.913078)).with_elevation(3.0));
        Arc::new(PoiCatalog::new(vec![chapel]).unwrap())
    }

    fn sample(ts: u64) -> PositionSample {
        PositionSample::new(-76.9420, 38.9129, 4.0, ts)
    }

    #[test]
    fn test_radius_hot_swap_scenario() {
        let radius = GeofenceRadius::new();
        let mut session = TourSession::new(catalog(), &SessionConfig::default(), radius.clone());

        let update = session.ingest(sample(0));
        assert!(matches!(&update, SessionUpdate::Positioned { events, .. } if events.is_empty()));
        assert!(!session.is_inside_geofence("chapel"));

        radius.set(30);
        let update = session.ingest(sample(1000));
        match update {
            SessionUpdate::Positioned { events, .. } => {
                assert_eq!(events.len(), 1);
                assert!(matches!(events[0], GeofenceEvent::Entered(_)));
            }
            other => panic!("unexpected update {:?}", other),
        }
        assert!(session.is_inside_geofence("chapel"));
        assert_eq!(session.current_radius(), Some(30));
    }

    #[test]
    fn test_rejected_sample_keeps_state() {
        let mut session = TourSession::new(
            catalog(),
            &SessionConfig::default(),
            GeofenceRadius::with_override(30),
        );
        session.ingest(sample(0));
        let before = session.snapshot();

        let update = session.ingest(PositionSample::new(-76.0, 38.0, 200.0, 1000));
        assert!(matches!(update, SessionUpdate::Rejected(_)));

        let after = session.snapshot();
        assert_eq!(after.position, before.position);
        assert_eq!(after.active_ids, before.active_ids);
        assert_eq!(after.stats.rejected, 1);
    }

    #[test]
    fn test_unavailable_degrades_and_recovers() {
        let mut session = TourSession::new(
            catalog(),
            &SessionConfig::default(),
            GeofenceRadius::with_override(30),
        );
        session.ingest(sample(0));

        let update = session.handle(LocationEvent::Unavailable("timeout".to_string()));
        assert_eq!(
            update,
            SessionUpdate::Degraded {
                reason: "timeout".to_string()
            }
        );
        assert!(matches!(session.status(), TrackingStatus::Degraded { .. }));
        // Last known state retained
        assert!(session.is_inside_geofence("chapel"));
        assert!(session.smoothed_position().is_some());

        let update = session.handle(LocationEvent::Sample(sample(2000)));
        assert!(matches!(update, SessionUpdate::Positioned { recovered: true, .. }));
        assert_eq!(session.status(), &TrackingStatus::Healthy);
    }

    #[test]
    fn test_resolve_active_anchors() {
        let mut session = TourSession::new(
            catalog(),
            &SessionConfig::default(),
            GeofenceRadius::with_override(30),
        );
        assert!(session.resolve_active_anchors(None).is_empty());

        session.ingest(sample(0));
        let anchors = session.resolve_active_anchors(None);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].point_id, "chapel");
        assert_eq!(anchors[0].local_position.y, 3.0);
        // Chapel lies north-east of the visitor
        assert!(anchors[0].local_position.x > 0.0);
        assert!(anchors[0].local_position.z < 0.0);

        assert!(session.resolve_anchor("missing", None).is_none());
    }

    #[test]
    fn test_snapshot_queries() {
        let mut session = TourSession::new(catalog(), &SessionConfig::default(), GeofenceRadius::new());
        let empty = session.snapshot();
        assert!(empty.position.is_none());
        assert!(empty.distance_to_point("chapel").is_none());

        session.ingest(sample(0));
        let snapshot = session.snapshot();
        let distance = snapshot.distance_to_point("chapel").unwrap();
        assert!(distance > 15.0 && distance < 30.0);
        assert!(!snapshot.is_inside_geofence("chapel"));
        assert_eq!(snapshot.current_radius(), None);
        assert_eq!(snapshot.state, TrackerState::Idle);
        assert_eq!(snapshot.stats.accepted, 1);
    }
}
