//! Liveness endpoint with a database ping.

use axum::extract::State;
use serde_json::json;

use crate::error::ApiError;
use crate::extract::Json;
use crate::routes::success;
use crate::state::AppState;

/// `GET /api/health`
pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.health_check().await {
        return Err(ApiError::Internal("Database is unavailable".to_string()));
    }

    Ok(success(json!({ "status": "ok", "database": "up" })))
}
