//! The descriptor catalog and the configuration source trait.
//!
//! The catalog is a single YAML document declaring the route table, the
//! controllers behind it, the DTO types they exchange and the extensible
//! configurations of specification-based resources.
//!
//! # File format
//!
//! ```yaml
//! routes:
//!   - template: persons/{guid}
//!     methods: [GET]
//!     controller: Persons
//!     action: GetPersonByGuid
//!     header_version:
//!       media_types: [application/vnd.hedtech.integration.v12.1.0+json]
//!       route_version: 12.1.0
//!       eedm: true
//!
//! controllers:
//!   - name: Persons
//!     module: Base
//!     actions:
//!       - name: GetPersonByGuidAsync
//!         returns: Person
//!
//! types:
//!   Person:
//!     kind: class
//!     properties:
//!       - { name: Id, json_name: id, type: string, column: ID }
//!
//! configurations:
//!   - configuration: { resource_name: x-widgets, api_type: A }
//!     versions:
//!       - { api_resource_name: x-widgets, api_version_number: 1.0.0 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::extensible::{ApiConfiguration, DeprecatedResource, ExtensibleData, ExtensibleDataRow};
use crate::route::{ControllerDescriptor, RouteDescriptor};
use crate::types::{FieldType, TypeDescriptor};

/// Provides resource configurations and column defaults.
///
/// The [`Catalog`] implements this from its own `configurations` section.
/// Services backed by a live configuration store supply their own.
pub trait ApiConfigurationSource: Send + Sync {
    /// Resource-level configuration, matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    fn configuration(&self, resource: &str) -> Result<Option<ApiConfiguration>>;

    /// Every version configured for `resource`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    fn version_configurations(&self, resource: &str) -> Result<Vec<ExtensibleData>>;

    /// Every version of every configured resource.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    fn all_extended_configurations(&self) -> Result<Vec<ExtensibleData>>;

    /// Fill missing column metadata (description, length, translation, usage).
    fn apply_data_row_defaults(&self, rows: Vec<ExtensibleDataRow>) -> Vec<ExtensibleDataRow> {
        rows
    }

    /// Whether data privacy rules apply to `resource`.
    fn has_privacy_rules(&self, _resource: &str) -> bool {
        false
    }

    /// Resources with deprecated representations.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    fn deprecated_resources(&self) -> Result<Vec<DeprecatedResource>> {
        Ok(Vec::new())
    }
}

/// A configured resource and its versions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfiguredResource {
    /// Resource-level configuration.
    pub configuration: ApiConfiguration,
    /// Version configurations.
    pub versions: Vec<ExtensibleData>,
}

/// Column metadata applied to rows that lack it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnDefault {
    /// Column the defaults apply to.
    pub column: String,
    /// Description.
    pub description: String,
    /// Maximum length.
    pub length: Option<usize>,
    /// Translation file.
    pub trans_file: String,
    /// Translation column.
    pub trans_column: String,
    /// Translation table.
    pub trans_table: String,
    /// Database usage (`K`, `I`, `U` ...).
    pub usage: String,
}

fn default_query_keywords() -> Vec<String> {
    vec!["limit".to_string(), "offset".to_string()]
}

/// The full descriptor catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Route table.
    pub routes: Vec<RouteDescriptor>,
    /// Controllers serving the routes.
    pub controllers: Vec<ControllerDescriptor>,
    /// DTO types keyed by name.
    pub types: BTreeMap<String, TypeDescriptor>,
    /// Extensible configurations.
    pub configurations: Vec<ConfiguredResource>,
    /// Deprecated resources.
    pub deprecated_resources: Vec<DeprecatedResource>,
    /// Resources subject to data privacy rules.
    pub privacy_resources: Vec<String>,
    /// Column defaults.
    pub data_row_defaults: Vec<ColumnDefault>,
    /// Query parameters that never count as filters.
    #[serde(default = "default_query_keywords")]
    pub query_keywords: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            controllers: Vec::new(),
            types: BTreeMap::new(),
            configurations: Vec::new(),
            deprecated_resources: Vec::new(),
            privacy_resources: Vec::new(),
            data_row_defaults: Vec::new(),
            query_keywords: default_query_keywords(),
        }
    }
}

impl Catalog {
    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the file cannot be read,
    /// or [`Error::Yaml`](crate::Error::Yaml) if it is not a valid catalog.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml(&content)?;
        tracing::info!(
            path = %path.display(),
            routes = catalog.routes.len(),
            types = catalog.types.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`](crate::Error::Yaml) on malformed input.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let catalog: Self = serde_yaml_ng::from_str(content)?;
        catalog.warn_unknown_types();
        Ok(catalog)
    }

    fn warn_unknown_types(&self) {
        let check = |owner: &str, ty: &FieldType| {
            if let Some(name) = ty.type_name() {
                if !self.types.contains_key(name) {
                    tracing::warn!(owner, type_name = name, "unknown type referenced; it will be skipped");
                }
            }
        };
        for (name, ty) in &self.types {
            for prop in ty.properties() {
                check(name, &prop.field_type);
            }
        }
        for controller in &self.controllers {
            for action in &controller.actions {
                for ty in [&action.returns, &action.request_body].into_iter().flatten() {
                    check(&action.name, ty);
                }
            }
        }
    }

    /// Look up a DTO by name.
    #[must_use]
    pub fn type_descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// The controller a route names.
    #[must_use]
    pub fn controller(&self, name: &str) -> Option<&ControllerDescriptor> {
        self.controllers.iter().find(|c| c.matches(name))
    }

    /// Routes whose API name equals `resource`.
    #[must_use]
    pub fn routes_for(&self, resource: &str) -> Vec<&RouteDescriptor> {
        self.routes
            .iter()
            .filter(|r| r.api_name() == resource)
            .collect()
    }

    /// Routes whose API name starts with `prefix`.
    #[must_use]
    pub fn routes_with_prefix(&self, prefix: &str) -> Vec<&RouteDescriptor> {
        self.routes
            .iter()
            .filter(|r| r.api_name().starts_with(prefix))
            .collect()
    }

    fn configured(&self, resource: &str) -> Option<&ConfiguredResource> {
        self.configurations
            .iter()
            .find(|c| c.configuration.resource_name.eq_ignore_ascii_case(resource))
    }
}

impl ApiConfigurationSource for Catalog {
    fn configuration(&self, resource: &str) -> Result<Option<ApiConfiguration>> {
        Ok(self.configured(resource).map(|c| c.configuration.clone()))
    }

    fn version_configurations(&self, resource: &str) -> Result<Vec<ExtensibleData>> {
        Ok(self
            .configured(resource)
            .map(|c| c.versions.clone())
            .unwrap_or_default())
    }

    fn all_extended_configurations(&self) -> Result<Vec<ExtensibleData>> {
        Ok(self
            .configurations
            .iter()
            .flat_map(|c| c.versions.iter().cloned())
            .collect())
    }

    fn apply_data_row_defaults(&self, rows: Vec<ExtensibleDataRow>) -> Vec<ExtensibleDataRow> {
        rows.into_iter()
            .map(|mut row| {
                let Some(default) = self
                    .data_row_defaults
                    .iter()
                    .find(|d| !row.column_name.is_empty() && d.column == row.column_name)
                else {
                    return row;
                };
                if row.description.is_empty() {
                    row.description.clone_from(&default.description);
                }
                if row.length.is_none() {
                    row.length = default.length;
                }
                if row.trans_file.is_empty() {
                    row.trans_file.clone_from(&default.trans_file);
                }
                if row.trans_column.is_empty() {
                    row.trans_column.clone_from(&default.trans_column);
                }
                if row.trans_table.is_empty() {
                    row.trans_table.clone_from(&default.trans_table);
                }
                if row.usage.is_empty() {
                    row.usage.clone_from(&default.usage);
                }
                row
            })
            .collect()
    }

    fn has_privacy_rules(&self, resource: &str) -> bool {
        self.privacy_resources
            .iter()
            .any(|r| r.eq_ignore_ascii_case(resource))
    }

    fn deprecated_resources(&self) -> Result<Vec<DeprecatedResource>> {
        Ok(self.deprecated_resources.clone())
    }
}
