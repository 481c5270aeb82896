//! `/metadata/manifest/...` handlers.

use axum::extract::{Path, State};
use axum::Json;
use colleague_metadata_openapi::{build_manifest, publish_manifest, ManifestQuery, ManifestRow};
use http::HeaderMap;

use crate::error::{ApiError, ApiResult};
use crate::headers::publish_requested;
use crate::state::AppState;

/// `GET /metadata/manifest/{domain}/{api_type}`.
///
/// A domain of `api` reads the next segment as a resource name.
pub async fn get_manifest(
    State(state): State<AppState>,
    Path((domain, api_type)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ManifestRow>>> {
    manifest(state, ManifestQuery::from_path(&domain, &api_type, None), &headers).await
}

/// `GET /metadata/manifest/api/{resource}/{version}`.
///
/// `any` and `all` select every version.
pub async fn get_manifest_version(
    State(state): State<AppState>,
    Path((domain, api_type, version)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ManifestRow>>> {
    let query = ManifestQuery::from_path(&domain, &api_type, Some(&version));
    manifest(state, query, &headers).await
}

async fn manifest(
    state: AppState,
    query: ManifestQuery,
    headers: &HeaderMap,
) -> ApiResult<Json<Vec<ManifestRow>>> {
    query.validate()?;
    let rows = build_manifest(state.catalog(), &query);
    tracing::info!(rows = rows.len(), ?query, "manifest built");
    if !publish_requested(headers) {
        return Ok(Json(rows));
    }

    let today = chrono::Local::now().date_naive();
    let kept = tokio::task::spawn_blocking(move || {
        publish_manifest(
            &state.synthesizer(),
            rows,
            &query,
            &state.config().publish_dir,
            today,
        )
    })
    .await
    .map_err(|err| ApiError::Internal(err.to_string()))??;
    Ok(Json(kept))
}
