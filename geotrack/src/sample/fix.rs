//! Position readings and the synced baseline.

use std::time::{Duration, Instant};

use crate::geo::Coordinate;

/// One sampled position reading.
///
/// Immutable once produced by a position source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    coordinate: Coordinate,
    speed_mps: Option<f64>,
    timestamp: Instant,
}

impl Fix {
    /// Create a fix stamped with the current instant.
    pub fn new(coordinate: Coordinate, speed_mps: Option<f64>) -> Self {
        Self::with_timestamp(coordinate, speed_mps, Instant::now())
    }

    /// Create a fix with an explicit timestamp.
    ///
    /// Platforms report `-1` when the speed is unknown, so negative and
    /// non-finite speeds are stored as absent.
    pub fn with_timestamp(coordinate: Coordinate, speed_mps: Option<f64>, timestamp: Instant) -> Self {
        Self {
            coordinate,
            speed_mps: speed_mps.filter(|s| s.is_finite() && *s >= 0.0),
            timestamp,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Ground speed in meters per second, if the source reported one.
    pub fn speed_mps(&self) -> Option<f64> {
        self.speed_mps
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Time elapsed since the fix was taken.
    pub fn age(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// The last fix accepted as a distance baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncedFix {
    /// Where the baseline fix was taken.
    pub coordinate: Coordinate,
    /// Distance from the baseline before it, in meters. Zero for the first
    /// fix of a session.
    pub distance_from_previous_m: f64,
}

impl SyncedFix {
    pub fn new(coordinate: Coordinate, distance_from_previous_m: f64) -> Self {
        Self {
            coordinate,
            distance_from_previous_m,
        }
    }

    /// Baseline for the first fix of a session.
    pub fn bootstrap(coordinate: Coordinate) -> Self {
        Self::new(coordinate, 0.0)
    }
}
