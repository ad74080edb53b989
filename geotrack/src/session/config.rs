//! Tracking session configuration.

use std::time::Duration;

use crate::sample::EvaluatorConfig;

/// Default polling interval (5 seconds).
pub const DEFAULT_INTERVAL_MS: u64 = 5_000;

/// Default time to wait for a fix before skipping the tick.
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(20);

/// Default maximum age of a fix before it is considered stale.
pub const DEFAULT_MAX_FIX_AGE: Duration = Duration::from_secs(1);

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration for a [`TrackingSession`](super::TrackingSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sync and infraction thresholds.
    pub evaluator: EvaluatorConfig,
    /// Per-read timeout for the position source.
    pub fix_timeout: Duration,
    /// Fixes older than this are skipped.
    pub max_fix_age: Duration,
    /// Events buffered per subscriber before slow subscribers lag.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorConfig::default(),
            fix_timeout: DEFAULT_FIX_TIMEOUT,
            max_fix_age: DEFAULT_MAX_FIX_AGE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SessionConfig {
    pub fn with_evaluator(mut self, evaluator: EvaluatorConfig) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_fix_timeout(mut self, timeout: Duration) -> Self {
        self.fix_timeout = timeout;
        self
    }

    pub fn with_max_fix_age(mut self, max_age: Duration) -> Self {
        self.max_fix_age = max_age;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.fix_timeout, Duration::from_secs(20));
        assert_eq!(config.max_fix_age, Duration::from_secs(1));
        assert_eq!(config.evaluator.distance_threshold_m, 300.0);
        assert_eq!(config.evaluator.speed_limit_kmh, 40.0);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::default()
            .with_fix_timeout(Duration::from_secs(3))
            .with_max_fix_age(Duration::from_millis(500))
            .with_evaluator(EvaluatorConfig::default().with_speed_limit(60.0));

        assert_eq!(config.fix_timeout, Duration::from_secs(3));
        assert_eq!(config.max_fix_age, Duration::from_millis(500));
        assert_eq!(config.evaluator.speed_limit_kmh, 60.0);
    }
}
