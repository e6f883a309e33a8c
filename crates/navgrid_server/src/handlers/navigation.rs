//! Navigation document endpoints.

use super::{check_rate_limit, parse_json_body, require_auth};
use crate::{error::ApiError, AppState};
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use navgrid_core::constants::NAVIGATION_KEY;
use navgrid_core::models::{Link, NavigationDocument};
use serde_json::{json, Value};

/// `GET /api/navigation` — the stored document, or the default one.
///
/// Reads are public and never fail: storage trouble degrades to defaults
/// inside the store adapter.
pub async fn get_navigation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    check_rate_limit(&state, &headers)?;

    let doc = state.store.get(NAVIGATION_KEY).await;
    Ok(Json(json!({ "success": true, "data": doc })))
}

/// Apply a navigation update body to the stored document.
///
/// Two body shapes are accepted: a bare array replaces the links sequence,
/// an object replaces `links` when present and shallow-merges `settings`
/// when present.
fn apply_update(doc: &mut NavigationDocument, body: &Value) -> Result<(), ApiError> {
    match body {
        Value::Array(_) => {
            let links: Vec<Link> = serde_json::from_value(body.clone())
                .map_err(|err| ApiError::Validation(format!("invalid links array: {err}")))?;
            doc.links = links;
            Ok(())
        }
        Value::Object(map) => {
            if let Some(links_value) = map.get("links") {
                let links: Vec<Link> = serde_json::from_value(links_value.clone())
                    .map_err(|err| ApiError::Validation(format!("invalid links array: {err}")))?;
                doc.links = links;
            }
            match map.get("settings") {
                Some(Value::Object(patch)) => {
                    doc.settings = doc.settings.merge_value(patch)?;
                }
                Some(_) => {
                    return Err(ApiError::Validation(
                        "settings must be a JSON object".to_string(),
                    ));
                }
                None => {}
            }
            Ok(())
        }
        _ => Err(ApiError::Validation(
            "expected a JSON object or a links array".to_string(),
        )),
    }
}

/// `POST /api/navigation` (auth required) — replace/merge the stored
/// document with the request body.
pub async fn save_navigation(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    check_rate_limit(&state, &headers)?;
    require_auth(&state, &headers)?;

    let value = parse_json_body(&body)?;
    let mut doc = state.store.get(NAVIGATION_KEY).await;
    apply_update(&mut doc, &value)?;

    if !state.store.put(NAVIGATION_KEY, &doc).await {
        return Err(ApiError::Storage(
            "navigation document was not persisted".to_string(),
        ));
    }
    Ok(Json(json!({
        "success": true,
        "message": "navigation data updated",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

#[cfg(test)]
mod tests {
    use super::apply_update;
    use navgrid_core::models::NavigationDocument;
    use serde_json::json;

    #[test]
    fn bare_array_replaces_links() {
        let mut doc = NavigationDocument::default();
        let body = json!([
            {"id": "x", "name": "X", "url": "http://x.example"}
        ]);
        apply_update(&mut doc, &body).unwrap();
        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.links[0].category, "main");
    }

    #[test]
    fn object_merges_settings_and_replaces_links() {
        let mut doc = NavigationDocument::default();
        let body = json!({
            "links": [],
            "settings": {"userName": "renamed"}
        });
        apply_update(&mut doc, &body).unwrap();
        assert!(doc.links.is_empty());
        assert_eq!(doc.settings.user_name, "renamed");
        assert_eq!(doc.settings.background_color, "#1a1a2e");
    }

    #[test]
    fn scalar_body_is_rejected() {
        let mut doc = NavigationDocument::default();
        assert!(apply_update(&mut doc, &json!(42)).is_err());
        assert!(apply_update(&mut doc, &json!({"settings": "nope"})).is_err());
    }
}
