//! Runtime geofence radius override.
//!
//! A single shared knob that, when set, replaces every point's configured
//! radius on the next evaluation cycle. The value is a whole number of
//! meters held in one atomic, so readers never observe a torn update and
//! all points switch together.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::poi::PointOfInterest;

/// Sentinel stored when no override is active.
const NO_OVERRIDE: u32 = 0;

/// Cloneable handle to the shared radius override.
///
/// All clones observe the same value. Writers call [`Self::set`] or
/// [`Self::clear`]; the evaluator reads via [`Self::effective_for`].
#[derive(Debug, Clone, Default)]
pub struct GeofenceRadius {
    override_m: Arc<AtomicU32>,
}

impl GeofenceRadius {
    /// Create a knob with no override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a knob with an initial override (0 means none).
    pub fn with_override(meters: u32) -> Self {
        let radius = Self::new();
        radius.set(meters);
        radius
    }

    /// Override the radius of every point. Zero clears the override.
    pub fn set(&self, meters: u32) {
        let previous = self.override_m.swap(meters, Ordering::SeqCst);
        if previous != meters {
            tracing::info!(
                previous_m = previous,
                radius_m = meters,
                "Geofence radius override changed"
            );
        }
    }

    /// Remove the override; points fall back to their configured radius.
    pub fn clear(&self) {
        self.set(NO_OVERRIDE);
    }

    /// The active override in meters, if any.
    pub fn current(&self) -> Option<u32> {
        match self.override_m.load(Ordering::SeqCst) {
            NO_OVERRIDE => None,
            meters => Some(meters),
        }
    }

    /// Radius in meters that applies to `point` right now.
    pub fn effective_for(&self, point: &PointOfInterest) -> f64 {
        self.current()
            .map(f64::from)
            .unwrap_or(point.radius_m)
    }
}
