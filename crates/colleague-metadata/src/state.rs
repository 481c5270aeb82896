//! Shared handler state.

use std::sync::Arc;
use std::time::Duration;

use colleague_metadata_core::{ApiConfigurationSource, Catalog};
use colleague_metadata_openapi::{ProjectConfig, ResourceDiscovery, Synthesizer};

use crate::cache::{CacheProvider, MemoryCache};

/// Catalog, configuration source, cache and settings shared by every
/// request. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
    source: Arc<dyn ApiConfigurationSource>,
    cache: Arc<dyn CacheProvider>,
    config: Arc<ProjectConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("routes", &self.catalog.routes.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State answering configuration lookups from the catalog itself and
    /// caching in memory for `config.cache_ttl_secs`.
    #[must_use]
    pub fn new(catalog: Catalog, config: ProjectConfig) -> Self {
        let catalog = Arc::new(catalog);
        let cache = MemoryCache::new(Duration::from_secs(config.cache_ttl_secs));
        Self {
            source: Arc::clone(&catalog) as Arc<dyn ApiConfigurationSource>,
            catalog,
            cache: Arc::new(cache),
            config: Arc::new(config),
        }
    }

    /// Replace the configuration source.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn ApiConfigurationSource>) -> Self {
        self.source = source;
        self
    }

    /// Replace the cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheProvider>) -> Self {
        self.cache = cache;
        self
    }

    /// The descriptor catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The shared cache.
    #[must_use]
    pub fn cache(&self) -> &dyn CacheProvider {
        self.cache.as_ref()
    }

    /// Project settings.
    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Document synthesizer over the catalog and source.
    #[must_use]
    pub fn synthesizer(&self) -> Synthesizer<'_> {
        Synthesizer::new(&self.catalog, self.source.as_ref()).with_page_limit(self.config.page_limit)
    }

    /// Resource discovery over the catalog and source.
    #[must_use]
    pub fn discovery(&self) -> ResourceDiscovery<'_> {
        ResourceDiscovery::new(&self.catalog, self.source.as_ref())
            .with_bulk_load_supported(self.config.bulk_load_supported)
    }

    /// The configuration source.
    #[must_use]
    pub fn source(&self) -> &dyn ApiConfigurationSource {
        self.source.as_ref()
    }
}
