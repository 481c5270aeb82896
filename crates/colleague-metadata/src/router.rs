//! Router construction.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{manifest, metadata, resources};
use crate::state::AppState;

/// Build the router serving metadata, manifests and resources.
///
/// Write methods on metadata are routed so they answer with the
/// not-supported error instead of `405`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/metadata", post(metadata::not_supported))
        .route(
            "/metadata/{resource}",
            get(metadata::get_metadata)
                .put(metadata::not_supported)
                .post(metadata::not_supported)
                .delete(metadata::not_supported),
        )
        .route(
            "/metadata/{resource}/{version}",
            get(metadata::get_metadata_version)
                .put(metadata::not_supported)
                .post(metadata::not_supported)
                .delete(metadata::not_supported),
        )
        .route("/metadata/manifest/{domain}/{api_type}", get(manifest::get_manifest))
        .route(
            "/metadata/manifest/{domain}/{api_type}/{version}",
            get(manifest::get_manifest_version),
        )
        .route("/resources", get(resources::get_resources))
        .with_state(state)
}
