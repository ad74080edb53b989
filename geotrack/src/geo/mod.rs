//! Great-circle geometry on a spherical Earth.
//!
//! This module provides the [`Coordinate`] type and the haversine distance
//! used by the sample evaluator to decide whether a fix has moved far enough
//! from the last synced baseline.
//!
//! # Example
//!
//! ```
//! use geotrack::geo::{distance, Coordinate};
//!
//! let a = Coordinate::new(0.0, 0.0);
//! let b = Coordinate::new(0.0, 0.0027);
//!
//! let meters = distance(a, b);
//! assert!((meters - 300.0).abs() < 3.0);
//! ```

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic position in decimal degrees.
///
/// Range checks are the position source's responsibility. The tracking core
/// trusts the values it receives; [`Coordinate::is_valid`] exists for sources
/// that want to reject bad input at their own boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, -90 to 90.
    pub latitude: f64,
    /// Longitude in degrees, -180 to 180.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Haversine distance between two coordinates, in meters.
///
/// Symmetric, never negative and never NaN for valid input. The intermediate
/// term is clamped to `[0, 1]` so rounding near antipodal points cannot
/// escape the domain of `sqrt`.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Distance between two possibly-missing readings.
///
/// A missing reading on either side yields 0 rather than a distance.
pub fn distance_between(a: Option<Coordinate>, b: Option<Coordinate>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => distance(a, b),
        _ => 0.0,
    }
}
