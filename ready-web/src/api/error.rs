//! HTTP mapping of common errors
//!
//! Handlers return `ApiResult<T>`; the common error taxonomy maps onto
//! status codes here. Internal failures are logged server-side and never
//! leaked into response bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ready_common::Error;
use serde_json::json;
use tracing::error;

/// Handler result type
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Wrapper carrying a common error into an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            // Deliberately undifferentiated: same body whether the email or
            // the password was wrong, and for missing/expired tokens.
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            other => {
                error!("Internal error serving request: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
