//! In-memory record store.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::collaborators::{BoxFuture, RecordStore};
use crate::error::StoreError;
use crate::sample::LocationRecord;

/// Keeps saved records in memory.
///
/// Can be switched into a failing mode where every save is rejected, which
/// stands in for an offline backend.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<LocationRecord>>,
    failing: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of the saved records, oldest first.
    pub fn records(&self) -> Vec<LocationRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn save(&self, record: LocationRecord) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Rejected("store is offline".to_string()));
            }
            self.records.lock().push(record);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::sample::{evaluate, EvaluatorConfig, Fix};

    fn record(lat: f64) -> LocationRecord {
        let fix = Fix::new(Coordinate::new(lat, 0.0), None);
        let decision = evaluate(None, &fix, &EvaluatorConfig::default());
        LocationRecord::from_sample(&fix, &decision)
    }

    #[tokio::test]
    async fn test_save_keeps_order() {
        let store = MemoryRecordStore::new();
        store.save(record(1.0)).await.unwrap();
        store.save(record(2.0)).await.unwrap();

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].latitude, 1.0);
        assert_eq!(records[1].latitude, 2.0);
    }

    #[tokio::test]
    async fn test_failing_mode_rejects() {
        let store = MemoryRecordStore::new();
        store.set_failing(true);

        let result = store.save(record(1.0)).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert!(store.is_empty());

        store.set_failing(false);
        store.save(record(1.0)).await.unwrap();
        assert_eq!(store.len(), 1);
    }
}
