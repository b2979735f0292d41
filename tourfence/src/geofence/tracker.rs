//! Geofence state tracking across evaluation cycles.
//!
//! Runs the evaluator over every point for each new smoothed position,
//! diffs the active set against the previous cycle and emits enter/exit
//! events.
//!
//! # State Machine
//!
//! ```text
//! Idle   --[any point active]-->  Active
//! Active --[no point active]--->  Idle    (notified set cleared)
//! ```
//!
//! # Notification suppression
//!
//! A point fires "entered" at most once per visit to the tour area. The
//! notified set only clears when the visitor has left every geofence, so
//! bouncing in and out of one point while standing in another does not
//! re-notify.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::evaluator::{GeofenceEvaluator, GeofenceResult};
use super::radius::GeofenceRadius;
use crate::coord::Coordinates;
use crate::poi::{PoiCatalog, PointId};
use crate::position::SmoothedPosition;

/// Whether any geofence is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerState {
    /// No point is active.
    #[default]
    Idle,
    /// At least one point is active.
    Active,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::Idle => write!(f, "idle"),
            TrackerState::Active => write!(f, "active"),
        }
    }
}

/// Change in a point's containment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "lowercase")]
pub enum GeofenceEvent {
    /// The visitor entered a point not yet notified this visit.
    Entered(GeofenceResult),
    /// The visitor left a point.
    Exited(GeofenceResult),
}

impl GeofenceEvent {
    /// The evaluation that produced this event.
    pub fn result(&self) -> &GeofenceResult {
        match self {
            GeofenceEvent::Entered(result) | GeofenceEvent::Exited(result) => result,
        }
    }

    /// Id of the point concerned.
    pub fn point_id(&self) -> &str {
        &self.result().point_id
    }
}

/// Per-session runtime sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeofenceRuntimeState {
    /// Points containing the latest position.
    pub active_ids: HashSet<PointId>,
    /// Points that were active on the cycle before.
    pub previous_active_ids: HashSet<PointId>,
    /// Points that already fired "entered" during this visit.
    pub notified_ids: HashSet<PointId>,
}

/// Aggregates per-point evaluations into enter/exit events.
#[derive(Debug)]
pub struct GeofenceStateTracker {
    catalog: Arc<PoiCatalog>,
    evaluator: GeofenceEvaluator,
    runtime: GeofenceRuntimeState,
    results: HashMap<PointId, GeofenceResult>,
    previous_position: Option<Coordinates>,
}

impl GeofenceStateTracker {
    /// Create a tracker over `catalog` reading the shared `radius` knob.
    pub fn new(catalog: Arc<PoiCatalog>, radius: GeofenceRadius) -> Self {
        Self {
            catalog,
            evaluator: GeofenceEvaluator::new(radius),
            runtime: GeofenceRuntimeState::default(),
            results: HashMap::new(),
            previous_position: None,
        }
    }

    /// Evaluate every point for a new smoothed position.
    ///
    /// Returns "entered" events (catalog order) followed by "exited"
    /// events (catalog order). The previous active set is replaced within
    /// the same call, so no event can fire twice for one transition.
    pub fn update(&mut self, position: &SmoothedPosition) -> Vec<GeofenceEvent> {
        let current = position.coordinates;
        let previous = self.previous_position;

        let mut current_active = HashSet::new();
        let mut results = HashMap::with_capacity(self.catalog.len());
        for point in self.catalog.points() {
            let result = self.evaluator.evaluate(point, &current, previous.as_ref());
            if result.is_inside {
                current_active.insert(point.id.clone());
            }
            results.insert(point.id.clone(), result);
        }

        let mut events = Vec::new();

        for point in self.catalog.points() {
            let id = &point.id;
            if current_active.contains(id)
                && !self.runtime.active_ids.contains(id)
                && !self.runtime.notified_ids.contains(id)
            {
                if let Some(result) = results.get(id) {
                    tracing::info!(
                        point = %id,
                        distance_m = result.distance_m,
                        direction = ?result.entry_direction,
                        "Entered geofence"
                    );
                    self.runtime.notified_ids.insert(id.clone());
                    events.push(GeofenceEvent::Entered(result.clone()));
                }
            }
        }

        for point in self.catalog.points() {
            let id = &point.id;
            if self.runtime.active_ids.contains(id) && !current_active.contains(id) {
                if let Some(result) = results.get(id) {
                    tracing::info!(point = %id, distance_m = result.distance_m, "Exited geofence");
                    events.push(GeofenceEvent::Exited(result.clone()));
                }
            }
        }

        let was_active = !self.runtime.active_ids.is_empty();
        if was_active && current_active.is_empty() {
            tracing::info!(
                cleared = self.runtime.notified_ids.len(),
                "Left all geofences, notifications re-armed"
            );
            self.runtime.notified_ids.clear();
        }

        self.runtime.previous_active_ids =
            std::mem::replace(&mut self.runtime.active_ids, current_active);
        self.results = results;
        self.previous_position = Some(current);

        tracing::debug!(
            active = self.runtime.active_ids.len(),
            events = events.len(),
            "Geofence cycle complete"
        );

        events
    }

    /// Current state of the machine.
    pub fn state(&self) -> TrackerState {
        if self.runtime.active_ids.is_empty() {
            TrackerState::Idle
        } else {
            TrackerState::Active
        }
    }

    /// Whether no point is active.
    pub fn is_idle(&self) -> bool {
        self.state() == TrackerState::Idle
    }

    /// Whether the latest position is inside point `id`.
    pub fn is_inside(&self, id: &str) -> bool {
        self.runtime.active_ids.contains(id)
    }

    /// Distance from the latest position to point `id`.
    pub fn distance_to(&self, id: &str) -> Option<f64> {
        self.results.get(id).map(|r| r.distance_m)
    }

    /// Active radius override, if any.
    pub fn current_radius(&self) -> Option<u32> {
        self.evaluator.radius().current()
    }

    /// The latest evaluation for point `id`.
    pub fn last_result(&self, id: &str) -> Option<&GeofenceResult> {
        self.results.get(id)
    }

    /// Ids of active points, in catalog order.
    pub fn active_ids(&self) -> Vec<PointId> {
        self.catalog
            .points()
            .iter()
            .filter(|p| self.runtime.active_ids.contains(&p.id))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Read-only view of the runtime sets.
    pub fn runtime_state(&self) -> &GeofenceRuntimeState {
        &self.runtime
    }

    /// The catalog being tracked.
    pub fn catalog(&self) -> &Arc<PoiCatalog> {
        &self.catalog
    }

    /// Forget all runtime state, as at the start of a session.
    pub fn reset(&mut self) {
        self.runtime = GeofenceRuntimeState::default();
        self.results.clear();
        self.previous_position = None;
    }
}
