//! Per-sample sync and infraction decisions.
//!
//! The evaluator is stateless: it receives the session's baseline by value
//! and returns a [`Decision`] without touching anything else.
//!
//! ```text
//! previous SyncedFix ─┐
//!                     ├──► evaluate() ──► Decision { distance, speed, sync?, infraction? }
//! current Fix ────────┘
//! ```

use crate::geo::{self, Coordinate};

use super::fix::{Fix, SyncedFix};

/// Default movement required before a fix is synced, in meters.
pub const DEFAULT_DISTANCE_THRESHOLD_M: f64 = 300.0;

/// Default speed limit, in km/h.
pub const DEFAULT_SPEED_LIMIT_KMH: f64 = 40.0;

const MPS_TO_KMH: f64 = 3.6;

/// Thresholds applied to every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorConfig {
    /// Minimum distance from the synced baseline for a fix to be synced.
    pub distance_threshold_m: f64,
    /// Speeds strictly above this are infractions.
    pub speed_limit_kmh: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            distance_threshold_m: DEFAULT_DISTANCE_THRESHOLD_M,
            speed_limit_kmh: DEFAULT_SPEED_LIMIT_KMH,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_distance_threshold(mut self, meters: f64) -> Self {
        self.distance_threshold_m = meters;
        self
    }

    pub fn with_speed_limit(mut self, kmh: f64) -> Self {
        self.speed_limit_kmh = kmh;
        self
    }
}

/// Outcome of evaluating one fix against the synced baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Distance from the synced baseline in meters (0 when bootstrapping).
    pub distance_m: f64,
    /// Reported speed converted to km/h and rounded to 2 decimals.
    pub speed_kmh: f64,
    /// Whether the fix becomes the new baseline and is persisted.
    pub should_sync: bool,
    /// Whether the speed exceeds the limit.
    pub is_infraction: bool,
}

impl Decision {
    /// The baseline to hold after syncing a fix taken at `coordinate`.
    pub fn synced_fix(&self, coordinate: Coordinate) -> SyncedFix {
        SyncedFix::new(coordinate, self.distance_m)
    }
}

/// Evaluate `current` against the session's last synced fix.
///
/// With no previous baseline the fix bootstraps the session: its distance is
/// 0 and it is always sync-worthy so later fixes have a reference point.
pub fn evaluate(previous: Option<SyncedFix>, current: &Fix, config: &EvaluatorConfig) -> Decision {
    let (distance_m, bootstrap) = match previous {
        Some(previous) => (geo::distance(previous.coordinate, current.coordinate()), false),
        None => (0.0, true),
    };

    let speed_kmh = current.speed_mps().map(speed_to_kmh).unwrap_or(0.0);

    Decision {
        distance_m,
        speed_kmh,
        should_sync: bootstrap || distance_m >= config.distance_threshold_m,
        is_infraction: speed_kmh > config.speed_limit_kmh,
    }
}

/// Convert m/s to km/h, rounded to 2 decimal places.
pub fn speed_to_kmh(speed_mps: f64) -> f64 {
    (speed_mps * MPS_TO_KMH * 100.0).round() / 100.0
}
