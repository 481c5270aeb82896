#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference
//!
//! # Types
//!
//! - [`build_router`]: The axum router for every endpoint
//! - [`AppState`]: Catalog, configuration source, cache and settings
//! - [`ApiError`]: Converts failures to Ethos JSON error responses
//! - [`CacheProvider`] / [`MemoryCache`]: Expiring JSON cache

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cache;
mod error;
pub mod handlers;
mod headers;
mod router;
mod state;

pub use cache::{
    metadata_key, CacheProvider, MemoryCache, DEPRECATED_RESOURCES_CACHE_KEY, METADATA_CACHE_KEY,
    RESOURCES_CACHE_KEY,
};
pub use error::{
    ApiError, ApiResult, DEFAULT_ERROR_CODE, DEFAULT_ERROR_DESCRIPTION, NOT_SUPPORTED_CODE,
    NOT_SUPPORTED_MESSAGE,
};
pub use headers::{bypass_cache, publish_requested, OPENAPI_MEDIA_TYPE, OPENAPI_PUBLISH_MEDIA_TYPE};
pub use router::build_router;
pub use state::AppState;
