//! Shared cache for synthesized documents and discovered resources.
//!
//! Entries are JSON values with an absolute expiry. Reads and writes are
//! not coordinated beyond the map lock: two requests missing the same key
//! both do the work and the last write wins.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::Value;

/// Prefix of the per-resource OpenAPI document key.
pub const METADATA_CACHE_KEY: &str = "EEDM_WEBAPI_METADATA_CACHE_KEY";

/// Key of the discovered resource list.
pub const RESOURCES_CACHE_KEY: &str = "EEDM_WEBAPI_RESOURCES_CACHE_KEY";

/// Key of the deprecated resource list.
pub const DEPRECATED_RESOURCES_CACHE_KEY: &str = "EEDM_WEBAPI_RESOURCES_CACHE_KEY_DeprecatedResources";

/// Key of the documents synthesized for `resource`.
#[must_use]
pub fn metadata_key(resource: &str) -> String {
    format!("{METADATA_CACHE_KEY}{resource}")
}

/// String-keyed store of JSON values.
pub trait CacheProvider: Send + Sync {
    /// The live entry under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: Value);

    /// Whether a live entry exists under `key`.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-process cache whose entries expire a fixed time after being set.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl MemoryCache {
    /// Cache with the given entry lifetime.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(colleague_metadata_openapi::DEFAULT_CACHE_TTL_SECS))
    }
}

impl CacheProvider for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired
        self.entries.write().remove(key);
        tracing::debug!(key, "cache entry expired");
        None
    }

    fn set(&self, key: &str, value: Value) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
    }
}
