//! HTTP submission to the gateway's insert endpoint

use std::time::Duration;

use quake_types::record::EarthquakeRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Failed response received from server: {status}")]
    Rejected { status: u16 },
}

/// Posts records as JSON to `<api_base>/add`.
#[derive(Clone)]
pub struct Submitter {
    client: reqwest::Client,
    endpoint: String,
}

impl Submitter {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, SubmitError> {
        let endpoint = format!("{}/add", api_base.trim_end_matches('/'));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::Transport {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit one record; anything but `200 OK` is an error.
    pub async fn submit(&self, record: &EarthquakeRecord) -> Result<(), SubmitError> {
        let res = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| SubmitError::Transport {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        if res.status() != reqwest::StatusCode::OK {
            return Err(SubmitError::Rejected {
                status: res.status().as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base() {
        let timeout = Duration::from_secs(1);
        assert_eq!(
            Submitter::new("http://localhost:8080", timeout).unwrap().endpoint(),
            "http://localhost:8080/add"
        );
        assert_eq!(
            Submitter::new("http://localhost:8080/", timeout).unwrap().endpoint(),
            "http://localhost:8080/add"
        );
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        // Port 9 (discard) is closed on test hosts.
        let submitter = Submitter::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = submitter
            .submit(&EarthquakeRecord::new(1.0, 2.0, 3.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Transport { .. }));
    }
}
