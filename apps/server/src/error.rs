//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! ## Error Flow
//! ```text
//! CoreError / DbError / ProcessError
//!       │
//!       ▼
//! ApiError (this module) ← status-code classification
//!       │
//!       ▼
//! JSON body { "error": "..." } with the mapped status
//! ```
//!
//! ## Status Mapping
//! ```text
//! validation, quantity, stock, payment, duplicate key, bad id  → 400
//! missing token / bad token                                    → 401
//! unknown product / transaction                                → 404
//! everything else                                              → 500
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use kasir_core::{CoreError, ValidationError};
use kasir_db::{DbError, ProcessError};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(m) => {
                error!(detail = %m, "Internal server error");
                // Detail is withheld outside debug builds
                let body = if cfg!(debug_assertions) {
                    m
                } else {
                    "Internal server error".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) | CoreError::TransactionNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }

            CoreError::InsufficientStock { .. }
            | CoreError::InvalidQuantity(_)
            | CoreError::InsufficientPayment { .. }
            | CoreError::AlreadyCancelled(_)
            | CoreError::Validation(_) => ApiError::BadRequest(err.to_string()),

            CoreError::ReceiptGenerationFailed { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ProcessError> for ApiError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Core(core) => core.into(),
            ProcessError::Db(db) => db.into(),
        }
    }
}
