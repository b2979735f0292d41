//! Position quality grading.
//!
//! A quality grade is a pure function of a fix's reported accuracy:
//!
//! ```text
//! accuracy <= 3m   Excellent
//! accuracy <= 8m   Good
//! accuracy <= 15m  Fair
//! accuracy <= 50m  Poor
//! otherwise        Unacceptable
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) for an Excellent fix, in meters.
pub const EXCELLENT_MAX_M: f64 = 3.0;

/// Upper bound (inclusive) for a Good fix, in meters.
pub const GOOD_MAX_M: f64 = 8.0;

/// Upper bound (inclusive) for a Fair fix, in meters.
pub const FAIR_MAX_M: f64 = 15.0;

/// Upper bound (inclusive) for a Poor fix, in meters.
pub const POOR_MAX_M: f64 = 50.0;

/// Quality grade of a position fix.
///
/// Ordered best to worst, so `Excellent < Poor` and a "no worse than"
/// check reads as `quality <= PositionQuality::Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Unacceptable,
}

impl PositionQuality {
    /// Grade a reported accuracy radius.
    ///
    /// Non-finite or negative accuracies grade as `Unacceptable`.
    pub fn from_accuracy(accuracy_m: f64) -> Self {
        if !accuracy_m.is_finite() || accuracy_m < 0.0 {
            return PositionQuality::Unacceptable;
        }

        if accuracy_m <= EXCELLENT_MAX_M {
            PositionQuality::Excellent
        } else if accuracy_m <= GOOD_MAX_M {
            PositionQuality::Good
        } else if accuracy_m <= FAIR_MAX_M {
            PositionQuality::Fair
        } else if accuracy_m <= POOR_MAX_M {
            PositionQuality::Poor
        } else {
            PositionQuality::Unacceptable
        }
    }

    /// Human-readable label for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            PositionQuality::Excellent => "excellent",
            PositionQuality::Good => "good",
            PositionQuality::Fair => "fair",
            PositionQuality::Poor => "poor",
            PositionQuality::Unacceptable => "unacceptable",
        }
    }
}

impl fmt::Display for PositionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
