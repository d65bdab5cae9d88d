//! Record sources driven by the generator loop

use async_trait::async_trait;
use quake_types::record::EarthquakeRecord;

pub mod manual;
pub mod random;

/// Produces one record per generator tick.
#[async_trait]
pub trait RecordSource: Send {
    /// `None` when the source is exhausted and the loop should stop.
    async fn next_record(&mut self) -> Option<EarthquakeRecord>;
}
