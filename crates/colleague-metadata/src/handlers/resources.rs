//! `GET /resources`.

use axum::extract::State;
use axum::Json;
use colleague_metadata_core::DeprecatedResource;
use http::HeaderMap;
use serde_json::Value;

use crate::cache::{DEPRECATED_RESOURCES_CACHE_KEY, RESOURCES_CACHE_KEY};
use crate::error::ApiResult;
use crate::headers::bypass_cache;
use crate::state::AppState;

/// Every Ethos resource with its representations, sorted by name.
pub async fn get_resources(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let cache = state.cache();
    if !bypass_cache(&headers) {
        if let Some(cached) = cache.get(RESOURCES_CACHE_KEY) {
            return Ok(Json(cached));
        }
    }

    let deprecated = deprecated_resources(&state);
    let resources = state.discovery().discover_with(&deprecated);
    tracing::info!(resources = resources.len(), "resources discovered");
    let value = serde_json::to_value(&resources)?;
    cache.set(RESOURCES_CACHE_KEY, value.clone());
    Ok(Json(value))
}

/// Deprecated resources, cached independently of `Cache-Control`.
///
/// A failing source yields an empty list, which is not cached.
fn deprecated_resources(state: &AppState) -> Vec<DeprecatedResource> {
    let cache = state.cache();
    if let Some(cached) = cache.get(DEPRECATED_RESOURCES_CACHE_KEY) {
        if let Ok(deprecated) = serde_json::from_value(cached) {
            return deprecated;
        }
    }
    match state.source().deprecated_resources() {
        Ok(deprecated) => {
            match serde_json::to_value(&deprecated) {
                Ok(value) => cache.set(DEPRECATED_RESOURCES_CACHE_KEY, value),
                Err(err) => tracing::warn!(error = %err, "deprecated resources not cached"),
            }
            deprecated
        }
        Err(err) => {
            tracing::error!(error = %err, "deprecated resources unavailable");
            Vec::new()
        }
    }
}
