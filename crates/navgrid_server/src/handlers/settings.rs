//! Settings endpoints.

use super::{check_rate_limit, parse_json_body, require_auth};
use crate::{error::ApiError, AppState};
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use navgrid_core::constants::NAVIGATION_KEY;
use serde_json::{json, Value};

/// `GET /api/settings` — the stored settings, or defaults.
pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    check_rate_limit(&state, &headers)?;

    let doc = state.store.get(NAVIGATION_KEY).await;
    Ok(Json(json!({ "success": true, "data": doc.settings })))
}

/// `POST /api/settings` (auth required) — shallow-merge the body into the
/// stored settings. Keys absent from the body are preserved, including
/// unknown ones.
pub async fn save_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    check_rate_limit(&state, &headers)?;
    require_auth(&state, &headers)?;

    let value = parse_json_body(&body)?;
    let Value::Object(patch) = value else {
        return Err(ApiError::Validation(
            "settings must be a JSON object".to_string(),
        ));
    };

    let mut doc = state.store.get(NAVIGATION_KEY).await;
    doc.settings = doc.settings.merge_value(&patch)?;

    if !state.store.put(NAVIGATION_KEY, &doc).await {
        return Err(ApiError::Storage("settings were not persisted".to_string()));
    }
    Ok(Json(json!({
        "success": true,
        "message": "settings saved",
        "data": doc.settings,
    })))
}
