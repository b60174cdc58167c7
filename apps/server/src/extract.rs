//! Request extractors.
//!
//! ## Why a Json Wrapper?
//! ```text
//! axum::Json rejection:   422, plain-text body
//! API contract:           400, { "error": "..." } envelope
//! ```
//!
//! Every handler body goes through this wrapper so a malformed or
//! incomplete payload is answered the same way as any other input
//! rejection.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::ApiError;

/// JSON body extractor that maps deserialization failures onto
/// [`ApiError::BadRequest`].
#[derive(Debug)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        total: i64,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_extracts() {
        let Json(payload) = Json::<Payload>::from_request(json_request(r#"{"total": 5000}"#), &())
            .await
            .unwrap();
        assert_eq!(payload.total, 5000);
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let err = Json::<Payload>::from_request(json_request(r#"{}"#), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let err = Json::<Payload>::from_request(json_request(r#"{"total": "#), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
