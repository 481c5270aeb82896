#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod components;
mod config;
mod context;
mod document;
mod error;
mod manifest;
mod media;
pub mod model;
mod operations;
mod paths;
mod projector;
mod publish;
mod resources;
mod schema;
mod synth;

pub use config::{ProjectConfig, DEFAULT_CACHE_TTL_SECS, DEFAULT_PUBLISH_DIR};
pub use document::{license, servers, PRIVACY_URL, SOURCE_SYSTEM};
pub use error::{Error, Result};
pub use manifest::{
    build_manifest, manifest_file_name, manifest_file_rows, write_manifest_csv, ManifestQuery,
    ManifestRow,
};
pub use media::{MediaSkip, RouteMedia};
pub use model::{OpenApiDocument, OPENAPI_VERSION};
pub use operations::V2_ERROR_MEDIA_TYPE;
pub use publish::{
    api_type_dir, document_path, publish_manifest, write_document, write_manifest, MANIFEST_DIR,
};
pub use resources::{
    ApiResource, Customizations, GetAllPattern, NamedQuery, Representation, ResourceDiscovery,
    BULK_REQUEST_MEDIA_TYPE,
};
pub use synth::Synthesizer;

/// Internal builders for advanced use and testing.
///
/// **Not covered by semver guarantees.** These re-exports are `#[doc(hidden)]`
/// and may change in any release, including patch versions.
#[doc(hidden)]
pub mod internal {
    pub use crate::components::build_components;
    pub use crate::context::{component_name, schema_prefix, RouteContext};
    pub use crate::document::{build_info, update_info};
    pub use crate::operations::OperationBuilder;
    pub use crate::paths::{add_route_path, configuration_paths};
    pub use crate::projector::SchemaProjector;
    pub use crate::schema::{filter_schema, id_schema, main_schema, named_query_schema, SchemaUse};
}
