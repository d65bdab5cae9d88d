//! SQLite document store
//!
//! Each record is stored as a JSON document, with the magnitude copied
//! into its own column so threshold scans do not need to parse documents.
//!
//! Thread-safe via internal Mutex (SQLite Connection is not Sync). All
//! SQLite work runs on the blocking pool.
//!
//! A caller that stops waiting (see [`crate::TimedStore`]) cannot cancel a
//! blocking task. With [`SqliteStore::with_deadline`] the task checks its
//! own deadline once it holds the connection and gives up before touching
//! the database, so work abandoned while queued never commits. A statement
//! that is already executing still runs to completion.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE data (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     magnitude REAL NOT NULL,
//!     doc TEXT NOT NULL
//! );
//! ```

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use quake_types::errors::StoreError;
use quake_types::filter::RecordFilter;
use quake_types::record::EarthquakeRecord;
use rusqlite::{params, Connection};
use tracing::debug;

use crate::RecordStore;

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    deadline: Option<Duration>,
}

impl SqliteStore {
    /// Open (or create) a file-backed database.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Connect {
            url: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                magnitude REAL NOT NULL,
                doc TEXT NOT NULL
            )",
            [],
        )
        .map_err(backend)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            deadline: None,
        })
    }

    /// Skip any call that could not start within `deadline` of being issued.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    async fn with_conn<T, F>(&self, operation: &'static str, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let deadline = self.deadline;
        let issued = Instant::now();

        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Backend("connection lock poisoned".to_string()))?;
            if let Some(after) = deadline {
                if issued.elapsed() >= after {
                    debug!(operation, "Store call expired before it started, skipping");
                    return Err(StoreError::Timeout { operation, after });
                }
            }
            work(&guard)
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
    }
}

fn backend(err: rusqlite::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn decode_docs(docs: Vec<String>) -> Result<Vec<EarthquakeRecord>, StoreError> {
    docs.iter()
        .map(|doc| serde_json::from_str(doc).map_err(|e| StoreError::Encoding(e.to_string())))
        .collect()
}

fn select_docs(conn: &Connection, filter: RecordFilter) -> Result<Vec<String>, StoreError> {
    match filter {
        RecordFilter::All => {
            let mut stmt = conn
                .prepare("SELECT doc FROM data ORDER BY id ASC")
                .map_err(backend)?;
            let rows = stmt.query_map([], |row| row.get(0)).map_err(backend)?;
            let docs = rows.collect::<Result<Vec<String>, _>>().map_err(backend)?;
            Ok(docs)
        }
        RecordFilter::MinMagnitude(threshold) => {
            let mut stmt = conn
                .prepare("SELECT doc FROM data WHERE magnitude >= ?1 ORDER BY id ASC")
                .map_err(backend)?;
            let rows = stmt
                .query_map(params![threshold], |row| row.get(0))
                .map_err(backend)?;
            let docs = rows.collect::<Result<Vec<String>, _>>().map_err(backend)?;
            Ok(docs)
        }
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert_record(&self, record: &EarthquakeRecord) -> Result<(), StoreError> {
        let doc = serde_json::to_string(record).map_err(|e| StoreError::Encoding(e.to_string()))?;
        let magnitude = record.magnitude;

        self.with_conn("insert_record", move |conn| {
            conn.execute(
                "INSERT INTO data (magnitude, doc) VALUES (?1, ?2)",
                params![magnitude, doc],
            )
            .map_err(backend)?;
            Ok(())
        })
        .await?;

        debug!(magnitude, "Record inserted");
        Ok(())
    }

    async fn find_records(&self, filter: RecordFilter) -> Result<Vec<EarthquakeRecord>, StoreError> {
        let docs = self.with_conn("find_records", move |conn| select_docs(conn, filter)).await?;
        decode_docs(docs)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.with_conn("count", |conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM data", [], |row| row.get(0))
                .map_err(backend)?;
            Ok(count as usize)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find_preserves_documents() {
        let store = SqliteStore::open_in_memory().unwrap();
        let plain = EarthquakeRecord::new(5.2, 34.1, -118.2);
        let from_feed = EarthquakeRecord::from_geojson(2.1, vec![-150.5, 61.2, 12.0]).unwrap();

        store.insert_record(&plain).await.unwrap();
        store.insert_record(&from_feed).await.unwrap();

        let found = store.find_records(RecordFilter::All).await.unwrap();
        assert_eq!(found, vec![plain, from_feed]);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_threshold_scan_is_inclusive() {
        let store = SqliteStore::open_in_memory().unwrap();
        for magnitude in [3.99, 4.0, 4.01] {
            store
                .insert_record(&EarthquakeRecord::new(magnitude, 0.0, 0.0))
                .await
                .unwrap();
        }

        let found = store
            .find_records(RecordFilter::MinMagnitude(4.0))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.magnitude >= 4.0));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_encoding_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .with_conn("insert_record", |conn| {
                conn.execute("INSERT INTO data (magnitude, doc) VALUES (1.0, 'not json')", [])
                    .map_err(backend)?;
                Ok(())
            })
            .await
            .unwrap();

        let err = store.find_records(RecordFilter::All).await.unwrap_err();
        assert!(matches!(err, StoreError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_expired_call_never_reaches_the_database() {
        let store = SqliteStore::open_in_memory()
            .unwrap()
            .with_deadline(Duration::from_millis(50));

        // Hold the connection so the insert queues past its deadline.
        let conn = Arc::clone(&store.conn);
        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let holder = std::thread::spawn(move || {
            let _guard = conn.lock().unwrap();
            locked_tx.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(300));
        });
        locked_rx.recv().unwrap();

        let err = store
            .insert_record(&EarthquakeRecord::new(5.0, 1.0, 2.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Timeout { operation: "insert_record", .. }));

        holder.join().unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_calls_within_deadline_run() {
        let store = SqliteStore::open_in_memory()
            .unwrap()
            .with_deadline(Duration::from_secs(5));
        store
            .insert_record(&EarthquakeRecord::new(5.0, 1.0, 2.0))
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
