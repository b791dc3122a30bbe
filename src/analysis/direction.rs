//! 8-point compass buckets

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the 8 cardinal buckets, each spanning 45°
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinal {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Cardinal {
    /// Scan order for bucket statistics; ties keep this order
    pub const ALL: [Cardinal; 8] = [
        Cardinal::N,
        Cardinal::NE,
        Cardinal::E,
        Cardinal::SE,
        Cardinal::S,
        Cardinal::SW,
        Cardinal::W,
        Cardinal::NW,
    ];

    /// Bucket a bearing. Any finite input is accepted and wrapped into [0, 360).
    ///
    /// 22.5° lands in NE: `f64::round` rounds half away from zero.
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        // normalized / 45 is in [0, 8], so the cast cannot truncate a sign
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = (normalized / 45.0).round() as usize % 8;
        Self::ALL[index]
    }

    /// Position in `ALL`
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The lee side: where wind from this direction deposits snow
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Cardinal::N => Cardinal::S,
            Cardinal::NE => Cardinal::SW,
            Cardinal::E => Cardinal::W,
            Cardinal::SE => Cardinal::NW,
            Cardinal::S => Cardinal::N,
            Cardinal::SW => Cardinal::NE,
            Cardinal::W => Cardinal::E,
            Cardinal::NW => Cardinal::SE,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Cardinal::N => "N",
            Cardinal::NE => "NE",
            Cardinal::E => "E",
            Cardinal::SE => "SE",
            Cardinal::S => "S",
            Cardinal::SW => "SW",
            Cardinal::W => "W",
            Cardinal::NW => "NW",
        }
    }
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cardinal label for an optional bearing, `"N/A"` when absent
#[must_use]
pub fn to_cardinal(degrees: Option<f64>) -> &'static str {
    degrees.map_or(super::NOT_AVAILABLE, |d| Cardinal::from_degrees(d).label())
}
