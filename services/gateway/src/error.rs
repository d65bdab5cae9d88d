use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quake_types::errors::{StoreError, ValidationError};
use serde_json::json;
use thiserror::Error;

/// Central error type for the gateway's HTTP surface
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Error reading incoming data: {0}")]
    BadRequest(#[from] ValidationError),

    #[error("{0}")]
    MethodNotAllowed(&'static str),

    #[error("Failed to retrieve data: {0}")]
    ReadFailed(StoreError),

    #[error("Error while adding data: {0}")]
    WriteFailed(StoreError),

    #[error("Store unavailable: {0}")]
    Unavailable(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string(), "BAD_REQUEST"),
            ApiError::MethodNotAllowed(msg) => (
                StatusCode::METHOD_NOT_ALLOWED,
                msg.to_string(),
                "METHOD_NOT_ALLOWED",
            ),
            // Store details stay in the logs.
            ApiError::ReadFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve data.".to_string(),
                "INTERNAL_ERROR",
            ),
            ApiError::WriteFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error while adding data.".to_string(),
                "INTERNAL_ERROR",
            ),
            ApiError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Store unavailable.".to_string(),
                "SERVICE_UNAVAILABLE",
            ),
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}
