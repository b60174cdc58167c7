//! Login and token verification handlers.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::extract::Json;
use crate::routes::success;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/login`
///
/// Checks the environment-supplied admin credential and issues a JWT.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let valid = body.email == state.config.admin_email
        && body.password == state.config.admin_password;

    if !valid {
        warn!(email = %body.email, "Rejected login attempt");
        return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
    }

    let token = state.jwt.generate_token(&body.email)?;
    info!(email = %body.email, "Admin logged in");

    Ok(success(json!({
        "token": token,
        "user": { "email": body.email, "role": "admin" },
    })))
}

/// `GET /api/auth/verify`
///
/// Validates the bearer token and echoes the principal it carries.
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| ApiError::Unauthorized("Expected a Bearer token".to_string()))?;

    let claims = state.jwt.validate_token(token)?;

    Ok(success(json!({
        "user": { "email": claims.sub, "role": claims.role },
    })))
}
