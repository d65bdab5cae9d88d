//! In-memory record store
//!
//! Keeps records in insertion order. Used by tests and by `memory://`
//! deployments where persistence across restarts is not wanted.

use async_trait::async_trait;
use quake_types::errors::StoreError;
use quake_types::filter::RecordFilter;
use quake_types::record::EarthquakeRecord;
use tokio::sync::RwLock;

use crate::RecordStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<EarthquakeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_record(&self, record: &EarthquakeRecord) -> Result<(), StoreError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find_records(&self, filter: RecordFilter) -> Result<Vec<EarthquakeRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let store = MemoryStore::new();
        let record = EarthquakeRecord::new(4.5, 10.0, 20.0);

        store.insert_record(&record).await.unwrap();
        store.insert_record(&record).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(
            store.find_records(RecordFilter::All).await.unwrap(),
            vec![record.clone(), record]
        );
    }

    #[tokio::test]
    async fn test_min_magnitude_filter() {
        let store = MemoryStore::new();
        for magnitude in [1.0, 3.9, 4.0, 7.1] {
            store
                .insert_record(&EarthquakeRecord::new(magnitude, 0.0, 0.0))
                .await
                .unwrap();
        }

        let found = store
            .find_records(RecordFilter::MinMagnitude(4.0))
            .await
            .unwrap();
        let magnitudes: Vec<f64> = found.iter().map(|r| r.magnitude).collect();
        assert_eq!(magnitudes, vec![4.0, 7.1]);
    }
}
