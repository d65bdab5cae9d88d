//! Store adapter for earthquake records
//!
//! A thin facade over a document store holding one logical collection of
//! [`EarthquakeRecord`] documents. Two operations matter: append one record,
//! and scan records (all of them, or those at or above a magnitude).
//!
//! - No upsert, no uniqueness constraint: the feed is re-polled from scratch
//!   every cycle, so overlapping events are reinserted and duplicates are
//!   expected.
//! - Every call carries a deadline ([`StoreConfig::op_timeout`]) and fails
//!   with [`StoreError::Timeout`] instead of blocking forever.
//! - One handle ([`SharedStore`]) is opened at startup and injected into every
//!   component that reads or writes.
//!
//! # Backends
//!
//! | URL | Backend |
//! |---|---|
//! | `sqlite://<path>` or a bare path | [`SqliteStore`] on disk |
//! | `sqlite::memory:` | [`SqliteStore`] in memory |
//! | `memory://` | [`MemoryStore`] |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quake_types::errors::StoreError;
use quake_types::filter::RecordFilter;
use quake_types::record::EarthquakeRecord;
use tracing::info;

pub mod memory;
pub mod sqlite;
pub mod timed;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use timed::TimedStore;

/// Backend-agnostic record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append one record. Duplicates are permitted.
    async fn insert_record(&self, record: &EarthquakeRecord) -> Result<(), StoreError>;

    /// Scan records matching `filter`, in store-defined order.
    async fn find_records(&self, filter: RecordFilter) -> Result<Vec<EarthquakeRecord>, StoreError>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize, StoreError>;
}

/// Process-wide store handle.
pub type SharedStore = Arc<dyn RecordStore>;

/// Deadlines applied by [`connect`].
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Upper bound on opening the backend.
    pub connect_timeout: Duration,
    /// Upper bound on each insert/find/count call.
    pub op_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            op_timeout: Duration::from_secs(5),
        }
    }
}

/// Where a connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    SqliteMemory,
    SqliteFile(String),
}

impl StoreLocation {
    pub fn parse(url: &str) -> Result<Self, StoreError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(StoreError::Connect {
                url: url.to_string(),
                reason: "empty connection string".to_string(),
            });
        }

        if url == "memory://" {
            return Ok(StoreLocation::Memory);
        }
        if url == "sqlite::memory:" || url == "sqlite://:memory:" {
            return Ok(StoreLocation::SqliteMemory);
        }
        if let Some(path) = url.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(StoreError::Connect {
                    url: url.to_string(),
                    reason: "missing database path".to_string(),
                });
            }
            return Ok(StoreLocation::SqliteFile(path.to_string()));
        }
        if url.contains("://") {
            return Err(StoreError::Connect {
                url: url.to_string(),
                reason: "unsupported store scheme".to_string(),
            });
        }

        Ok(StoreLocation::SqliteFile(url.to_string()))
    }
}

/// Open the store named by `url`, wrapped with the per-call deadline.
pub async fn connect(url: &str, config: StoreConfig) -> Result<SharedStore, StoreError> {
    let location = StoreLocation::parse(url)?;

    let store: SharedStore = match location {
        StoreLocation::Memory => Arc::new(TimedStore::new(MemoryStore::new(), config.op_timeout)),
        StoreLocation::SqliteMemory => {
            let sqlite = open_within(url, config.connect_timeout, SqliteStore::open_in_memory)
                .await?
                .with_deadline(config.op_timeout);
            Arc::new(TimedStore::new(sqlite, config.op_timeout))
        }
        StoreLocation::SqliteFile(path) => {
            let sqlite = open_within(url, config.connect_timeout, move || SqliteStore::open(&path))
                .await?
                .with_deadline(config.op_timeout);
            Arc::new(TimedStore::new(sqlite, config.op_timeout))
        }
    };

    info!(
        url,
        op_timeout_ms = config.op_timeout.as_millis() as u64,
        "Connected to record store"
    );

    Ok(store)
}

async fn open_within<F>(url: &str, deadline: Duration, open: F) -> Result<SqliteStore, StoreError>
where
    F: FnOnce() -> Result<SqliteStore, StoreError> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(open);

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result.map_err(|e| StoreError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        }),
        Ok(Err(join)) => Err(StoreError::Connect {
            url: url.to_string(),
            reason: join.to_string(),
        }),
        Err(_) => Err(StoreError::Timeout {
            operation: "connect",
            after: deadline,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locations() {
        assert_eq!(StoreLocation::parse("memory://").unwrap(), StoreLocation::Memory);
        assert_eq!(
            StoreLocation::parse("sqlite::memory:").unwrap(),
            StoreLocation::SqliteMemory
        );
        assert_eq!(
            StoreLocation::parse("sqlite://data/quakes.db").unwrap(),
            StoreLocation::SqliteFile("data/quakes.db".to_string())
        );
        assert_eq!(
            StoreLocation::parse("quakes.db").unwrap(),
            StoreLocation::SqliteFile("quakes.db".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let err = StoreLocation::parse("mongodb://localhost:27017").unwrap_err();
        assert!(matches!(err, StoreError::Connect { .. }));
        assert!(StoreLocation::parse("  ").is_err());
        assert!(StoreLocation::parse("sqlite://").is_err());
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let store = connect("memory://", StoreConfig::default()).await.unwrap();
        store
            .insert_record(&EarthquakeRecord::new(5.0, 1.0, 2.0))
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
