use crate::error::ApiError;
use crate::models::ADDED_MESSAGE;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use quake_types::record::EarthquakeRecord;
use tracing::{error, info, warn};

pub async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<EarthquakeRecord>>, ApiError> {
    let records = state
        .store
        .find_records(state.policy.read_filter())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to read records");
            ApiError::ReadFailed(e)
        })?;

    Ok(Json(records))
}

// Body is decoded by hand so any malformed payload is a 400, whatever the
// content type.
pub async fn add_record(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), ApiError> {
    let record = EarthquakeRecord::from_json(&body).map_err(|e| {
        warn!(error = %e, "Rejected malformed record");
        ApiError::from(e)
    })?;

    if !state.policy.accepts(&record) {
        info!(
            magnitude = record.magnitude,
            min_magnitude = state.policy.min_magnitude,
            "Record below magnitude threshold, skipping insertion"
        );
        return Ok((StatusCode::OK, ADDED_MESSAGE));
    }

    state.store.insert_record(&record).await.map_err(|e| {
        error!(error = %e, "Failed to insert record");
        ApiError::WriteFailed(e)
    })?;

    info!(?record, "New data added");
    Ok((StatusCode::OK, ADDED_MESSAGE))
}

pub async fn get_only() -> ApiError {
    ApiError::MethodNotAllowed("Only GET requests are accepted.")
}

pub async fn post_only() -> ApiError {
    ApiError::MethodNotAllowed("Only POST requests are accepted.")
}
