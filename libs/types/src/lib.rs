//! Types library for the earthquake feed service
//!
//! Every crate in the workspace speaks in these types: the record that
//! flows from the feed (or a generator, or an HTTP client) into the store,
//! the filter used to read it back, and the shared error taxonomy.
//!
//! # Modules
//! - `record`: `EarthquakeRecord`, the only persisted entity
//! - `filter`: `RecordFilter` for reads, `RecordPolicy` for the magnitude threshold
//! - `errors`: Error taxonomy (`StoreError`, `FetchError`, `ValidationError`)

pub mod errors;
pub mod filter;
pub mod record;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::filter::*;
    pub use crate::record::*;
}
