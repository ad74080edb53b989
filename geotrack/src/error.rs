//! Error types for the tracking core and its collaborators.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by a tracking session.
///
/// Only [`TrackingError::PermissionDenied`] and
/// [`TrackingError::InvalidInterval`] are returned to callers, from
/// `start()`. The other two are recovered inside the tick loop and logged.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The permission provider refused location access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// No usable fix for this tick.
    #[error("Position unavailable: {0}")]
    PositionUnavailable(#[from] PositionError),

    /// The record store rejected a synced fix.
    #[error("Failed to persist location record: {0}")]
    PersistenceFailure(#[from] StoreError),

    /// The polling interval must be positive.
    #[error("Invalid polling interval: {0}ms (must be greater than zero)")]
    InvalidInterval(u64),
}

/// Reasons a position source could not deliver a fix.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PositionError {
    /// The read did not complete within the request timeout.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The fix is older than the configured maximum age.
    #[error("Fix is {age:?} old (max {max_age:?})")]
    Stale { age: Duration, max_age: Duration },

    /// The source has no fix right now.
    #[error("{0}")]
    Unavailable(String),

    /// A finite source has delivered all of its fixes.
    #[error("Position source exhausted")]
    Exhausted,
}

/// Errors from a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error writing the record.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store refused the record.
    #[error("Record rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_interval_display() {
        let err = TrackingError::InvalidInterval(0);
        assert!(err.to_string().contains("0ms"));
    }

    #[test]
    fn test_position_error_converts() {
        let err: TrackingError = PositionError::Timeout(Duration::from_secs(20)).into();
        assert!(matches!(err, TrackingError::PositionUnavailable(_)));
        assert!(err.to_string().contains("Timed out"));
    }

    #[test]
    fn test_store_error_converts() {
        let err: TrackingError = StoreError::Rejected("offline".to_string()).into();
        assert!(matches!(err, TrackingError::PersistenceFailure(_)));
        assert!(err.to_string().contains("offline"));
    }
}
