//! Request header interpretation.

use http::header::{ACCEPT, CACHE_CONTROL};
use http::HeaderMap;

/// Content type of OpenAPI document responses.
pub const OPENAPI_MEDIA_TYPE: &str = "application/vnd.oai.openapi.v3+json";

/// Accept type asking for documents to be published as well as returned.
pub const OPENAPI_PUBLISH_MEDIA_TYPE: &str = "application/vnd.oai.openapi.publish.v3+json";

/// Whether `Cache-Control` carries the `no-cache` directive.
#[must_use]
pub fn bypass_cache(headers: &HeaderMap) -> bool {
    headers
        .get_all(CACHE_CONTROL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|directive| directive.trim().eq_ignore_ascii_case("no-cache"))
}

/// Whether any accepted media type asks for publishing.
#[must_use]
pub fn publish_requested(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|media| media.split(';').next().unwrap_or_default().trim())
        .any(|media| media.to_ascii_lowercase().contains("openapi.publish"))
}
