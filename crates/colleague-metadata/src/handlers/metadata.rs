//! `/metadata/{resource}[/{version}]` handlers.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use colleague_metadata_core::version::{latest_version, strip_beta};
use colleague_metadata_openapi::{write_document, OpenApiDocument};
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use serde_json::Value;

use crate::cache::metadata_key;
use crate::error::{ApiError, ApiResult};
use crate::headers::{bypass_cache, publish_requested, OPENAPI_MEDIA_TYPE};
use crate::state::AppState;

/// `GET /metadata/{resource}`: every document of the resource.
pub async fn get_metadata(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    if resource.trim().is_empty() {
        return Err(ApiError::integration(
            "API name is needed to return OpenAPI specifications.",
        ));
    }
    let documents = documents(&state, &resource, bypass_cache(&headers))?;
    let body = render(&state, &documents, publish_requested(&headers)).await;
    Ok(openapi_response(Value::Array(body)))
}

/// `GET /metadata/{resource}/{version}`: the documents of one version.
///
/// `latest` picks the highest version. Otherwise a version equal to the
/// requested one (ignoring `-beta`) wins over versions merely starting
/// with it. A single match is returned as an object.
pub async fn get_metadata_version(
    State(state): State<AppState>,
    Path((resource, version)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    if resource.trim().is_empty() {
        return Err(ApiError::integration(
            "API name is needed to return OpenAPI specifications.",
        ));
    }
    if version.trim().is_empty() {
        return Err(ApiError::integration(
            "Version is needed to return OpenAPI specifications for a specific version.",
        ));
    }

    let documents = documents(&state, &resource, bypass_cache(&headers))?;
    if documents.is_empty() {
        return Err(ApiError::KeyNotFound(format!(
            "No openAPI specifications found for version '{version}' of the resource {resource}"
        )));
    }
    let selected: Vec<OpenApiDocument> = select_version(&documents, &version)?
        .into_iter()
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(ApiError::integration(
            "OpenAPI specifications does not exist for this version.",
        ));
    }

    let mut body = render(&state, &selected, publish_requested(&headers)).await;
    let body = if body.len() == 1 {
        body.remove(0)
    } else {
        Value::Array(body)
    };
    Ok(openapi_response(body))
}

/// `PUT`, `POST` and `DELETE` on metadata.
pub async fn not_supported() -> ApiError {
    ApiError::not_supported()
}

/// Documents of `resource`, from the cache unless `bypass` is set.
///
/// Freshly synthesized documents are written back to the cache.
///
/// # Errors
///
/// Returns an error when synthesis fails as a whole.
pub fn documents(state: &AppState, resource: &str, bypass: bool) -> ApiResult<Vec<OpenApiDocument>> {
    let key = metadata_key(resource);
    if !bypass {
        if let Some(cached) = state.cache().get(&key) {
            match serde_json::from_value(cached) {
                Ok(documents) => return Ok(documents),
                Err(err) => tracing::warn!(%key, error = %err, "unreadable cache entry; rebuilding"),
            }
        }
    }

    let documents = state.synthesizer().openapi(resource)?;
    tracing::info!(resource, documents = documents.len(), "documents synthesized");
    state.cache().set(&key, serde_json::to_value(&documents)?);
    Ok(documents)
}

/// Documents matching `version`.
///
/// `latest` resolves to the highest version with the metadata comparer.
///
/// # Errors
///
/// Returns [`ApiError::KeyNotFound`] when a document version is not numeric.
pub fn select_version<'d>(
    documents: &'d [OpenApiDocument],
    version: &str,
) -> ApiResult<Vec<&'d OpenApiDocument>> {
    let target = if version.eq_ignore_ascii_case("latest") {
        let latest = latest_version(documents.iter().map(|d| d.info.version.as_str()))
            .map_err(colleague_metadata_openapi::Error::from)?;
        strip_beta(&latest)
    } else {
        version.to_string()
    };

    let versioned = || documents.iter().filter(|d| !d.info.version.is_empty());
    let exact: Vec<&OpenApiDocument> = versioned()
        .filter(|d| strip_beta(&d.info.version) == target)
        .collect();
    if !exact.is_empty() {
        return Ok(exact);
    }
    Ok(versioned()
        .filter(|d| d.info.version.starts_with(target.as_str()))
        .collect())
}

/// JSON bodies of `documents`, publishing them first when asked.
///
/// A document failing to publish or serialize is logged; one that fails to
/// serialize is left out.
async fn render(state: &AppState, documents: &[OpenApiDocument], publish: bool) -> Vec<Value> {
    if publish {
        publish_documents(state.config().publish_dir.clone(), documents.to_vec()).await;
    }
    let mut body = Vec::with_capacity(documents.len());
    for document in documents {
        match document.to_json_value() {
            Ok(value) => body.push(value),
            Err(err) => tracing::error!(title = %document.info.title, error = %err, "document skipped"),
        }
    }
    body
}

async fn publish_documents(root: PathBuf, documents: Vec<OpenApiDocument>) {
    let written = tokio::task::spawn_blocking(move || {
        for document in &documents {
            if let Err(err) = write_document(&root, document) {
                tracing::error!(title = %document.info.title, error = %err, "publish failed");
            }
        }
    })
    .await;
    if let Err(err) = written {
        tracing::error!(error = %err, "publish task failed");
    }
}

fn openapi_response(body: Value) -> Response {
    ([(CONTENT_TYPE, OPENAPI_MEDIA_TYPE)], Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use colleague_metadata_openapi::servers;
    use pretty_assertions::assert_eq;

    fn document(version: &str) -> OpenApiDocument {
        let mut document = OpenApiDocument::new(Default::default(), servers());
        document.info.title = "persons".to_string();
        document.info.version = version.to_string();
        document
    }

    fn versions<'d>(selected: &[&'d OpenApiDocument]) -> Vec<&'d str> {
        selected.iter().map(|d| d.info.version.as_str()).collect()
    }

    #[test]
    fn latest_picks_highest_version() {
        let docs = [document("6.0.0"), document("12.1.0"), document("8.0.0")];
        assert_eq!(versions(&select_version(&docs, "latest").unwrap()), vec!["12.1.0"]);
        assert_eq!(versions(&select_version(&docs, "LATEST").unwrap()), vec!["12.1.0"]);
    }

    #[test]
    fn exact_match_ignores_beta() {
        let docs = [document("1.0.0-beta"), document("1.0.0.1")];
        assert_eq!(versions(&select_version(&docs, "1.0.0").unwrap()), vec!["1.0.0-beta"]);
    }

    #[test]
    fn prefix_match_when_no_exact_version() {
        let docs = [document("12.1.0"), document("12.2.0"), document("6.0.0")];
        assert_eq!(versions(&select_version(&docs, "12").unwrap()), vec!["12.1.0", "12.2.0"]);
        assert!(select_version(&docs, "7").unwrap().is_empty());
    }

    #[test]
    fn unversioned_documents_never_match() {
        let docs = [document("")];
        assert!(select_version(&docs, "latest").unwrap().is_empty());
        assert!(select_version(&docs, "").unwrap().is_empty());
    }

    #[test]
    fn latest_with_beta_matches_its_document() {
        let docs = [document("1.0.0"), document("2.0.0-beta")];
        assert_eq!(versions(&select_version(&docs, "latest").unwrap()), vec!["2.0.0-beta"]);
    }

    #[test]
    fn non_numeric_version_is_not_found() {
        let docs = [document("1.0.0"), document("v2")];
        let err = select_version(&docs, "latest").unwrap_err();
        assert_eq!(err.status(), http::StatusCode::NOT_FOUND);
    }
}
