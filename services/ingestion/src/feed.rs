//! External feed client
//!
//! Decodes documents shaped as
//! `{ features: [ { properties: { mag }, geometry: { coordinates: [lon, lat, ...] } } ] }`.
//! Everything else in the USGS payload is ignored.

use std::time::Duration;

use async_trait::async_trait;
use quake_types::errors::FetchError;
use quake_types::record::EarthquakeRecord;
use serde::Deserialize;
use tracing::{debug, warn};

/// Default feed: all events the USGS query endpoint returns by default.
pub const USGS_FEED_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query?format=geojson";

/// One decoded feature, flattened to the fields the service keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeature {
    pub magnitude: f64,
    pub longitude: f64,
    pub latitude: f64,
    /// Raw GeoJSON coordinate list (`[lon, lat, depth?]`).
    pub coordinates: Vec<f64>,
}

impl RawFeature {
    pub fn into_record(self) -> EarthquakeRecord {
        EarthquakeRecord {
            magnitude: self.magnitude,
            latitude: self.latitude,
            longitude: self.longitude,
            coordinates: Some(self.coordinates),
        }
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: Properties,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Properties {
    mag: Option<f64>,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

/// Decode a feed document into flattened features.
///
/// Features without a magnitude or with fewer than two coordinates are
/// skipped; a document that is not valid JSON of the expected shape is an
/// error.
pub fn decode_features(body: &[u8]) -> Result<Vec<RawFeature>, FetchError> {
    let collection: FeatureCollection =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let total = collection.features.len();
    let mut out = Vec::with_capacity(total);

    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(magnitude) = feature.properties.mag else {
            warn!(index, "Skipping feature without magnitude");
            continue;
        };
        let coordinates = feature.geometry.map(|g| g.coordinates).unwrap_or_default();
        let (longitude, latitude) = match coordinates.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            _ => {
                warn!(index, len = coordinates.len(), "Skipping feature with short coordinates");
                continue;
            }
        };

        out.push(RawFeature {
            magnitude,
            longitude,
            latitude,
            coordinates,
        });
    }

    debug!(total, decoded = out.len(), "Feed document decoded");
    Ok(out)
}

/// Anything the ingestion loop can poll.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<RawFeature>, FetchError>;
}

/// HTTP client for a GeoJSON feed URL.
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch_latest(&self) -> Result<Vec<RawFeature>, FetchError> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            return Err(FetchError::Status(res.status().as_u16()));
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        decode_features(&body)
    }
}
