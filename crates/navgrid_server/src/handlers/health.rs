//! Health/liveness endpoint.

use super::check_rate_limit;
use crate::{error::ApiError, AppState};
use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

/// `GET /api/health` — liveness payload including a storage probe.
///
/// Reports whether any admin secret is configured without revealing it.
pub async fn health(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    check_rate_limit(&state, &headers)?;

    let kv_up = state.store.probe().await;
    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "services": {
            "kv": kv_up,
            "api": true,
        },
        "environment": {
            "has_auth": state.config.has_auth(),
        },
    })))
}
