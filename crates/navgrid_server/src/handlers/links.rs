//! Link add/remove endpoints.
//!
//! Links have no update-in-place operation: they are appended whole and
//! removed by id, with full-sequence replacement left to the navigation
//! endpoint.

use super::{check_rate_limit, parse_json_body};
use crate::{error::ApiError, AppState};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use navgrid_core::constants::NAVIGATION_KEY;
use navgrid_core::models::{Link, NewLinkRequest};
use serde_json::{json, Value};

/// `POST /api/links` — append a new link, generating an id and applying
/// category/icon defaults.
pub async fn add_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    check_rate_limit(&state, &headers)?;

    let value = parse_json_body(&body)?;
    let req: NewLinkRequest = serde_json::from_value(value)
        .map_err(|err| ApiError::Validation(format!("invalid link payload: {err}")))?;
    let link = Link::from_request(req)?;

    let mut doc = state.store.get(NAVIGATION_KEY).await;
    doc.links.push(link.clone());

    if !state.store.put(NAVIGATION_KEY, &doc).await {
        return Err(ApiError::Storage("link was not persisted".to_string()));
    }
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "link added",
            "data": link,
        })),
    ))
}

/// `DELETE /api/links/{id}` — remove the link with the matching id.
pub async fn delete_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    check_rate_limit(&state, &headers)?;

    let mut doc = state.store.get(NAVIGATION_KEY).await;
    if !doc.remove_link(&id) {
        return Err(ApiError::NotFound(format!("link '{id}' does not exist")));
    }

    if !state.store.put(NAVIGATION_KEY, &doc).await {
        return Err(ApiError::Storage("link removal was not persisted".to_string()));
    }
    Ok(Json(json!({
        "success": true,
        "message": "link deleted",
    })))
}
