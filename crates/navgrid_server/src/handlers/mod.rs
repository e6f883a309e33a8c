//! HTTP request handlers.

/// Health/liveness endpoint.
pub mod health;
/// Link add/remove endpoints.
pub mod links;
/// Navigation document endpoints.
pub mod navigation;
/// Settings endpoints.
pub mod settings;

use crate::{error::ApiError, AppState};
use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use serde_json::Value;

/// Headers consulted for the client identifier, in order.
const CLIENT_IP_HEADERS: [&str; 2] = ["cf-connecting-ip", "x-forwarded-for"];

/// Derive the rate-limit key for a request.
///
/// Falls back to `"unknown"` when no connecting-IP header is present, so
/// all unidentified clients share one bucket.
pub(crate) fn client_key(headers: &HeaderMap) -> String {
    for name in CLIENT_IP_HEADERS {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let first = value.split(',').next().map(str::trim).unwrap_or("");
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    "unknown".to_string()
}

/// Rate-limit preamble shared by every non-preflight handler.
pub(crate) fn check_rate_limit(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if state.limiter.check(&client_key(headers)) {
        Ok(())
    } else {
        Err(ApiError::RateLimited)
    }
}

/// Compare the `Authorization` header against the configured secrets.
///
/// The header value is matched exactly, with no scheme prefix.
pub(crate) fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let candidate = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !candidate.is_empty() && state.config.is_authorized(candidate) {
        Ok(())
    } else {
        Err(ApiError::Auth)
    }
}

/// Parse a request body as JSON, with an explicit 400 on failure.
///
/// Bodies are parsed from raw bytes so malformed JSON gets our error shape
/// instead of the extractor's.
pub(crate) fn parse_json_body(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError::Validation(format!("invalid JSON body: {err}")))
}

pub(crate) async fn health_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed(&["GET", "OPTIONS"])
}

pub(crate) async fn navigation_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed(&["GET", "POST", "OPTIONS"])
}

pub(crate) async fn links_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed(&["POST", "OPTIONS"])
}

pub(crate) async fn link_id_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed(&["DELETE", "OPTIONS"])
}

pub(crate) async fn settings_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed(&["GET", "POST", "OPTIONS"])
}

#[cfg(test)]
mod tests {
    use super::client_key;
    use axum::http::HeaderMap;

    #[test]
    fn client_key_prefers_connecting_ip_header() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", "203.0.113.9".parse().unwrap());
        headers.insert("x-forwarded-for", "198.51.100.1".parse().unwrap());
        assert_eq!(client_key(&headers), "203.0.113.9");
    }

    #[test]
    fn client_key_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "198.51.100.1, 10.0.0.2".parse().unwrap(),
        );
        assert_eq!(client_key(&headers), "198.51.100.1");
    }

    #[test]
    fn client_key_falls_back_to_shared_bucket() {
        assert_eq!(client_key(&HeaderMap::new()), "unknown");
    }
}
