//! Earthquake record
//!
//! The wire shape is `{magnitude, latitude, longitude[, coordinates]}`.
//! `coordinates` mirrors the GeoJSON `[lon, lat, ...]` list and is kept
//! only for wire compatibility; `longitude`/`latitude` are authoritative.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// One normalized earthquake observation.
///
/// Records carry no identity. The store may assign one internally, but it
/// is never part of the record and duplicates are expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    pub magnitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Vec<f64>>,
}

impl EarthquakeRecord {
    /// Create a record without the raw coordinate list.
    pub fn new(magnitude: f64, latitude: f64, longitude: f64) -> Self {
        Self {
            magnitude,
            latitude,
            longitude,
            coordinates: None,
        }
    }

    /// Attach `[longitude, latitude]` as the raw coordinate list.
    pub fn with_coordinates(mut self) -> Self {
        self.coordinates = Some(vec![self.longitude, self.latitude]);
        self
    }

    /// Build a record from a GeoJSON point.
    ///
    /// GeoJSON orders coordinates as `[lon, lat, depth?]`. Returns `None`
    /// when fewer than two coordinates are present.
    pub fn from_geojson(magnitude: f64, coordinates: Vec<f64>) -> Option<Self> {
        let (longitude, latitude) = match coordinates.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            _ => return None,
        };

        Some(Self {
            magnitude,
            latitude,
            longitude,
            coordinates: Some(coordinates),
        })
    }

    /// Decode a record from an inbound JSON body.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
    }

    /// Whether this record reaches the given magnitude threshold (inclusive).
    pub fn reaches(&self, threshold: f64) -> bool {
        self.magnitude >= threshold
    }
}
