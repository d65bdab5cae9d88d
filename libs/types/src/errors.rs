//! Error types shared across the workspace
//!
//! Error taxonomy using thiserror

use std::time::Duration;

use thiserror::Error;

/// Failures of the store adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Failed to connect to store at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Store operation {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Stored document could not be encoded or decoded: {0}")]
    Encoding(String),
}

/// Failures reaching or decoding the external feed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Feed transport error: {0}")]
    Transport(String),

    #[error("Feed responded with status {0}")]
    Status(u16),

    #[error("Feed document is malformed: {0}")]
    Decode(String),
}

/// Malformed inbound payloads.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Malformed record body: {0}")]
    MalformedBody(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = StoreError::Timeout {
            operation: "insert_record",
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "Store operation insert_record timed out after 5s");
    }

    #[test]
    fn test_fetch_status_display() {
        assert_eq!(FetchError::Status(503).to_string(), "Feed responded with status 503");
    }
}
