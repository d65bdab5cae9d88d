use crate::error::ApiError;
use crate::models::HealthResponse;
use crate::state::AppState;
use axum::{extract::State, Json};

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let records = state.store.count().await.map_err(ApiError::Unavailable)?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        records,
    }))
}
