//! The document persisted for each synced fix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evaluator::Decision;
use super::fix::Fix;

/// A qualifying fix as handed to the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters from the previous synced fix.
    pub distance: f64,
    /// km/h, rounded to 2 decimals.
    pub speed: f64,
    pub recorded_at: DateTime<Utc>,
    /// Set by downstream sync tooling; always false when produced here.
    pub synced: bool,
}

impl LocationRecord {
    /// Build the record for `fix` using the values computed for it.
    pub fn from_sample(fix: &Fix, decision: &Decision) -> Self {
        Self::at(fix, decision, Utc::now())
    }

    /// Build the record with an explicit wall-clock time.
    pub fn at(fix: &Fix, decision: &Decision, recorded_at: DateTime<Utc>) -> Self {
        let coordinate = fix.coordinate();
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            distance: decision.distance_m,
            speed: decision.speed_kmh,
            recorded_at,
            synced: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use chrono::TimeZone;

    #[test]
    fn test_record_carries_decision_values() {
        let fix = Fix::new(Coordinate::new(-25.5, -54.5), Some(12.0));
        let decision = Decision {
            distance_m: 321.0,
            speed_kmh: 43.2,
            should_sync: true,
            is_infraction: true,
        };

        let record = LocationRecord::from_sample(&fix, &decision);
        assert_eq!(record.latitude, -25.5);
        assert_eq!(record.longitude, -54.5);
        assert_eq!(record.distance, 321.0);
        assert_eq!(record.speed, 43.2);
        assert!(!record.synced);
    }

    #[test]
    fn test_record_json_field_names() {
        let fix = Fix::new(Coordinate::new(1.0, 2.0), None);
        let decision = Decision {
            distance_m: 0.0,
            speed_kmh: 0.0,
            should_sync: true,
            is_infraction: false,
        };
        let when = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let json = serde_json::to_value(LocationRecord::at(&fix, &decision, when)).unwrap();
        assert_eq!(json["latitude"], 1.0);
        assert_eq!(json["longitude"], 2.0);
        assert_eq!(json["recordedAt"], "2024-05-01T12:00:00Z");
        assert_eq!(json["synced"], false);
    }
}
