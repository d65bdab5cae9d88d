//! Per-call deadline wrapper

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use quake_types::errors::StoreError;
use quake_types::filter::RecordFilter;
use quake_types::record::EarthquakeRecord;
use tracing::warn;

use crate::RecordStore;

/// Wraps a store so every call fails with [`StoreError::Timeout`] once
/// `timeout` elapses.
///
/// Only the wait is abandoned. Work the inner store already handed to
/// another thread may still complete, so a timed-out insert can be stored.
/// Pair it with [`crate::SqliteStore::with_deadline`] to drop work that had
/// not started yet.
pub struct TimedStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: RecordStore> TimedStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "Store call timed out");
                Err(StoreError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for TimedStore<S> {
    async fn insert_record(&self, record: &EarthquakeRecord) -> Result<(), StoreError> {
        self.bounded("insert_record", self.inner.insert_record(record)).await
    }

    async fn find_records(&self, filter: RecordFilter) -> Result<Vec<EarthquakeRecord>, StoreError> {
        self.bounded("find_records", self.inner.find_records(filter)).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.bounded("count", self.inner.count()).await
    }
}
