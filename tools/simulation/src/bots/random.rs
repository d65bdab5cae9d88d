//! Uniform random reporter
//!
//! Samples magnitude from `[0, 10)`, latitude from `[-90, 90)` and
//! longitude from `[-180, 180)`. Seeded runs are reproducible.

use async_trait::async_trait;
use quake_types::record::EarthquakeRecord;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::RecordSource;

pub const MAGNITUDE_RANGE: std::ops::Range<f64> = 0.0..10.0;
pub const LATITUDE_RANGE: std::ops::Range<f64> = -90.0..90.0;
pub const LONGITUDE_RANGE: std::ops::Range<f64> = -180.0..180.0;

/// Random reporter with a ChaCha8 stream.
pub struct RandomReporter {
    pub records_generated: u64,
    rng: ChaCha8Rng,
}

impl RandomReporter {
    /// Create a reporter with a deterministic seed.
    pub fn new(seed: u64) -> Self {
        Self {
            records_generated: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create a reporter seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            records_generated: 0,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn generate(&mut self) -> EarthquakeRecord {
        let magnitude = self.rng.gen_range(MAGNITUDE_RANGE);
        let latitude = self.rng.gen_range(LATITUDE_RANGE);
        let longitude = self.rng.gen_range(LONGITUDE_RANGE);

        self.records_generated += 1;
        EarthquakeRecord::new(magnitude, latitude, longitude).with_coordinates()
    }
}

#[async_trait]
impl RecordSource for RandomReporter {
    async fn next_record(&mut self) -> Option<EarthquakeRecord> {
        Some(self.generate())
    }
}
