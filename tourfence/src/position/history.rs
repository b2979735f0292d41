//! Bounded history of accepted position samples.
//!
//! Holds the most recent samples that feed the averaging window and the
//! stability check.
//!
//! # Design
//!
//! - Fixed capacity (the averaging window, 12 by default)
//! - Oldest sample evicted first when full
//! - Samples are kept in arrival order; the caller is expected to deliver
//!   them with non-decreasing timestamps

use std::collections::VecDeque;

use super::sample::PositionSample;
use crate::coord::Coordinates;

/// Default number of samples retained.
pub const DEFAULT_CAPACITY: usize = 12;

/// Fixed-capacity FIFO of position samples (oldest first).
#[derive(Debug, Clone)]
pub struct PositionHistory {
    samples: VecDeque<PositionSample>,
    capacity: usize,
}

impl Default for PositionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PositionHistory {
    /// Create an empty history holding at most `capacity` samples.
    ///
    /// A capacity of zero is raised to one so the latest sample is always
    /// available.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when at capacity.
    ///
    /// Returns the evicted sample, if any.
    pub fn push(&mut self, sample: PositionSample) -> Option<PositionSample> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    /// Maximum number of samples retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Remove all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Iterate over samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &PositionSample> {
        self.samples.iter()
    }

    /// The most recently pushed sample.
    pub fn latest(&self) -> Option<&PositionSample> {
        self.samples.back()
    }

    /// Milliseconds between the oldest and newest sample.
    pub fn time_span_ms(&self) -> Option<u64> {
        let oldest = self.samples.front()?;
        let newest = self.samples.back()?;
        Some(newest.timestamp_ms.saturating_sub(oldest.timestamp_ms))
    }

    /// Equal-weight arithmetic mean of all buffered coordinates.
    pub fn mean_coordinates(&self) -> Option<Coordinates> {
        if self.samples.is_empty() {
            return None;
        }

        let n = self.samples.len() as f64;
        let (lon_sum, lat_sum) = self.samples.iter().fold((0.0, 0.0), |(lon, lat), s| {
            (lon + s.coordinates.longitude, lat + s.coordinates.latitude)
        });

        Some(Coordinates::new(lon_sum / n, lat_sum / n))
    }

    /// Equal-weight mean of the buffered accuracy radii.
    pub fn mean_accuracy(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.accuracy_m).sum();
        Some(sum / self.samples.len() as f64)
    }

    /// Samples covering the most recent `duration_ms`, newest first.
    ///
    /// Walks back from the newest sample until reaching one taken at or
    /// before `newest - duration_ms`, which is included so the window
    /// actually spans the requested duration.
    ///
    /// # Returns
    ///
    /// `None` if the history does not reach back far enough or the window
    /// would contain fewer than two samples.
    pub fn covering_window(&self, duration_ms: u64) -> Option<Vec<&PositionSample>> {
        let newest = self.samples.back()?;
        let cutoff = newest.timestamp_ms.checked_sub(duration_ms)?;

        let mut window = Vec::with_capacity(self.samples.len());
        for sample in self.samples.iter().rev() {
            window.push(sample);
            if window.len() >= 2 && sample.timestamp_ms <= cutoff {
                return Some(window);
            }
        }

        None
    }
}
