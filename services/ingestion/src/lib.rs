//! Ingestion Service
//!
//! Polls the public USGS GeoJSON feed and writes normalized records into
//! the record store.
//!
//! # Architecture
//!
//! ```text
//!   USGS GeoJSON feed
//!          │
//!     ┌────▼────┐
//!     │  Feed   │  ← GET + decode into (mag, lon, lat) triples
//!     └────┬────┘
//!          │
//!     ┌────▼─────┐
//!     │ Ingester │  ← magnitude policy, retry/backoff, cycle timer
//!     └────┬─────┘
//!          │
//!     ┌────▼────┐
//!     │  Store  │  ← insert_record per accepted triple
//!     └─────────┘
//! ```
//!
//! The feed is re-read from scratch every cycle, there is no cursor, so
//! overlapping events are reinserted on each pass.

pub mod feed;
pub mod ingestion;

pub use feed::{decode_features, FeedSource, HttpFeed, RawFeature, USGS_FEED_URL};
pub use ingestion::{
    CycleReport, FailurePolicy, IngestConfig, IngestError, IngestStats, Ingester, RetryPolicy,
};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
