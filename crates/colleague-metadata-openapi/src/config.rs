//! Project-level configuration loaded from YAML.
//!
//! Keeps deployment knobs (catalog location, publish directory, paging and
//! cache settings) next to the catalog instead of in Rust source. The CLI
//! and the HTTP service both start from this file and let flags override it.
//!
//! # File format
//!
//! ```yaml
//! # colleague-metadata.yaml
//! catalog: catalog/colleague.yaml
//!
//! # Root of the published YAML documents and manifest files.
//! publish_dir: Source/Documentation/OpenAPI
//!
//! bind_addr: 127.0.0.1:8080
//! cache_ttl_secs: 86400
//!
//! # List bulk representations and batch patterns in resource discovery.
//! bulk_load_supported: false
//!
//! # Page limit for routes whose paging filter declares none.
//! page_limit: 100
//! ```

use std::path::{Path, PathBuf};

use colleague_metadata_core::DEFAULT_PAGE_LIMIT;
use serde::Deserialize;

/// Default root of published documents, relative to the working directory.
pub const DEFAULT_PUBLISH_DIR: &str = "Source/Documentation/OpenAPI";

/// Default entry lifetime of cached documents and resources (one day).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;

/// Project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Path of the descriptor catalog.
    pub catalog: Option<PathBuf>,

    /// Root directory documents and manifests are published to.
    pub publish_dir: PathBuf,

    /// Address the HTTP service listens on.
    pub bind_addr: String,

    /// Lifetime of cache entries in seconds.
    pub cache_ttl_secs: u64,

    /// Whether clients support bulk loads.
    pub bulk_load_supported: bool,

    /// Page limit used when a route declares none.
    pub page_limit: u32,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            publish_dir: PathBuf::from(DEFAULT_PUBLISH_DIR),
            bind_addr: "127.0.0.1:8080".to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            bulk_load_supported: false,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ProjectConfig {
    /// Load config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        tracing::debug!(path = %path.display(), "project config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserialize_defaults() {
        let config: ProjectConfig = serde_yaml_ng::from_str("{}").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.publish_dir, PathBuf::from("Source/Documentation/OpenAPI"));
        assert_eq!(config.page_limit, 100);
        assert_eq!(config.cache_ttl_secs, 86_400);
        assert!(!config.bulk_load_supported);
    }

    #[test]
    fn deserialize_full() {
        let yaml = indoc::indoc! {"
            catalog: catalog.yaml
            publish_dir: /srv/openapi
            bind_addr: 0.0.0.0:9000
            bulk_load_supported: true
            page_limit: 25
        "};
        let config: ProjectConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.catalog, Some(PathBuf::from("catalog.yaml")));
        assert_eq!(config.publish_dir, PathBuf::from("/srv/openapi"));
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert!(config.bulk_load_supported);
        assert_eq!(config.page_limit, 25);
        // Unset values keep defaults
        assert_eq!(config.cache_ttl_secs, 86_400);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "page_limit: 10\n").unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.page_limit, 10);
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn load_errors() {
        assert!(ProjectConfig::load(Path::new("/nonexistent/config.yaml")).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "page_limit: [[[invalid").unwrap();
        assert!(ProjectConfig::load(&path).is_err());
    }
}
