//! HTTP error mapping for API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use navgrid_core::StoreError;
use serde_json::json;
use thiserror::Error;

/// API-level error taxonomy, mapped one-to-one onto HTTP status classes.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Auth,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed(&'static [&'static str]),

    #[error("Too many requests")]
    RateLimited,

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Internal server error")]
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidLink(msg) => Self::Validation(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Short, non-sensitive diagnostic identifier for 500 responses.
fn diagnostic_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().unsigned_abs();
    to_base36(millis)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": msg }),
            ),
            ApiError::Auth => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": "unauthorized" }),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": msg }),
            ),
            ApiError::MethodNotAllowed(allowed) => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({
                    "success": false,
                    "message": "method not allowed",
                    "allowedMethods": allowed,
                }),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "success": false, "message": "too many requests, retry later" }),
            ),
            ApiError::Storage(msg) => {
                tracing::error!("storage failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "message": "could not persist data" }),
                )
            }
            ApiError::Internal => {
                let error_id = diagnostic_id();
                tracing::error!(%error_id, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "message": "internal server error",
                        "errorId": error_id,
                    }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::to_base36;

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
