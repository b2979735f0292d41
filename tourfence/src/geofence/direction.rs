//! Entry direction classification.
//!
//! The heading of travel between two consecutive smoothed positions is
//! quantized to one of eight compass octants, which in turn maps onto one
//! of the six faces of a geofence hexagon.
//!
//! # Octant to face table
//!
//! ```text
//! heading  crossed face
//! E        West
//! NE       SouthWest
//! N        SouthWest   (shares face with NE)
//! NW       SouthEast
//! W        East
//! SW       NorthEast
//! S        NorthEast   (shares face with SW)
//! SE       NorthWest
//! ```
//!
//! Configured entry messages are keyed by the octant, so this table must
//! stay fixed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::Coordinates;

/// Width of one compass octant in degrees.
const OCTANT_DEG: f64 = 45.0;

/// Heading of travel, quantized to eight octants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    #[serde(rename = "E")]
    East,
    #[serde(rename = "NE")]
    NorthEast,
    #[serde(rename = "N")]
    North,
    #[serde(rename = "NW")]
    NorthWest,
    #[serde(rename = "W")]
    West,
    #[serde(rename = "SW")]
    SouthWest,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "SE")]
    SouthEast,
}

/// Octants in counter-clockwise order starting at east (atan2 order).
const OCTANTS: [CompassDirection; 8] = [
    CompassDirection::East,
    CompassDirection::NorthEast,
    CompassDirection::North,
    CompassDirection::NorthWest,
    CompassDirection::West,
    CompassDirection::SouthWest,
    CompassDirection::South,
    CompassDirection::SouthEast,
];

impl CompassDirection {
    /// Quantize an angle (degrees, counter-clockwise from east) to its octant.
    pub fn from_angle(degrees: f64) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        let index = ((normalized + OCTANT_DEG / 2.0) / OCTANT_DEG).floor() as usize % OCTANTS.len();
        OCTANTS[index]
    }

    /// Hexagon face crossed when travelling on this heading.
    pub fn hex_face(&self) -> HexFace {
        match self {
            CompassDirection::East => HexFace::West,
            CompassDirection::NorthEast => HexFace::SouthWest,
            CompassDirection::North => HexFace::SouthWest,
            CompassDirection::NorthWest => HexFace::SouthEast,
            CompassDirection::West => HexFace::East,
            CompassDirection::SouthWest => HexFace::NorthEast,
            CompassDirection::South => HexFace::NorthEast,
            CompassDirection::SouthEast => HexFace::NorthWest,
        }
    }

    /// Short compass abbreviation ("N", "SE", ...).
    pub fn abbreviation(&self) -> &'static str {
        match self {
            CompassDirection::East => "E",
            CompassDirection::NorthEast => "NE",
            CompassDirection::North => "N",
            CompassDirection::NorthWest => "NW",
            CompassDirection::West => "W",
            CompassDirection::SouthWest => "SW",
            CompassDirection::South => "S",
            CompassDirection::SouthEast => "SE",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// One of the six faces of a geofence hexagon.
///
/// Hexagons have vertices on the north and south axes, so the faces are
/// east, west and the four diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HexFace {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl fmt::Display for HexFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HexFace::East => "east",
            HexFace::NorthEast => "north-east",
            HexFace::NorthWest => "north-west",
            HexFace::West => "west",
            HexFace::SouthWest => "south-west",
            HexFace::SouthEast => "south-east",
        };
        f.write_str(name)
    }
}

/// Heading of travel from `previous` to `current`.
///
/// Computes `atan2(Δlat, Δlon)` and quantizes it to an octant.
///
/// # Returns
///
/// `None` without a previous position, or when the two positions are
/// identical (no displacement, no heading).
pub fn bearing_direction(
    previous: Option<&Coordinates>,
    current: &Coordinates,
) -> Option<CompassDirection> {
    let previous = previous?;
    let dlat = current.latitude - previous.latitude;
    let dlon = current.longitude - previous.longitude;

    if dlat == 0.0 && dlon == 0.0 {
        return None;
    }

    Some(CompassDirection::from_angle(dlat.atan2(dlon).to_degrees()))
}
