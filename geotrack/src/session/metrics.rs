//! Session counters.
//!
//! Lock-free atomic counters updated from the tick loop and the persistence
//! tasks, copied into a [`SessionSnapshot`] for display.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one tracking session.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    ticks: AtomicU64,
    ticks_overlapped: AtomicU64,
    position_failures: AtomicU64,
    stale_fixes: AtomicU64,
    fixes_evaluated: AtomicU64,
    records_synced: AtomicU64,
    records_persisted: AtomicU64,
    persistence_failures: AtomicU64,
    infractions: AtomicU64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn tick_started(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn tick_overlapped(&self) {
        self.ticks_overlapped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn position_failed(&self) {
        self.position_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fix_stale(&self) {
        self.stale_fixes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fix_evaluated(&self) {
        self.fixes_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_synced(&self) {
        self.records_synced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_persisted(&self) {
        self.records_persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn persistence_failed(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn infraction(&self) {
        self.infractions.fetch_add(1, Ordering::Relaxed);
    }

    /// Zero every counter.
    pub(crate) fn reset(&self) {
        for counter in [
            &self.ticks,
            &self.ticks_overlapped,
            &self.position_failures,
            &self.stale_fixes,
            &self.fixes_evaluated,
            &self.records_synced,
            &self.records_persisted,
            &self.persistence_failures,
            &self.infractions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            ticks_overlapped: self.ticks_overlapped.load(Ordering::Relaxed),
            position_failures: self.position_failures.load(Ordering::Relaxed),
            stale_fixes: self.stale_fixes.load(Ordering::Relaxed),
            fixes_evaluated: self.fixes_evaluated.load(Ordering::Relaxed),
            records_synced: self.records_synced.load(Ordering::Relaxed),
            records_persisted: self.records_persisted.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            infractions: self.infractions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SessionMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Ticks that reached the position source.
    pub ticks: u64,
    /// Ticks skipped because the previous one was still running.
    pub ticks_overlapped: u64,
    /// Reads that failed or timed out.
    pub position_failures: u64,
    /// Fixes dropped for exceeding the maximum age.
    pub stale_fixes: u64,
    /// Fixes passed to the evaluator.
    pub fixes_evaluated: u64,
    /// Fixes that became the new baseline and were sent to the store.
    pub records_synced: u64,
    /// Saves the store confirmed.
    pub records_persisted: u64,
    /// Saves the store rejected.
    pub persistence_failures: u64,
    /// Samples over the speed limit.
    pub infractions: u64,
}

impl SessionSnapshot {
    /// Saves sent to the store that have not completed yet.
    pub fn persistence_pending(&self) -> u64 {
        self.records_synced
            .saturating_sub(self.records_persisted + self.persistence_failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = SessionMetrics::new();
        metrics.tick_started();
        metrics.tick_started();
        metrics.fix_evaluated();
        metrics.record_synced();
        metrics.record_synced();
        metrics.record_persisted();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.fixes_evaluated, 1);
        assert_eq!(snapshot.records_synced, 2);
        assert_eq!(snapshot.persistence_pending(), 1);
    }

    #[test]
    fn test_reset() {
        let metrics = SessionMetrics::new();
        metrics.tick_started();
        metrics.infraction();
        metrics.persistence_failed();

        metrics.reset();
        assert_eq!(metrics.snapshot(), SessionSnapshot::default());
    }
}
