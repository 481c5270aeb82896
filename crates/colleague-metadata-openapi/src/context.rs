//! Per-route synthesis state.

use std::collections::BTreeMap;

use colleague_metadata_core::{ApiConfiguration, ExtensibleData};

/// State carried through one route (or one configuration) while its
/// operations and components are built.
///
/// A fresh value is created for every route, so nothing leaks from one
/// route into the next.
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    /// Emit the v2 error schema (`errors_2_0_0`) and the 405/406 defaults.
    pub use_v2_errors: bool,
    /// Projected query-string filter groups keyed by group name.
    pub query_names: BTreeMap<String, ExtensibleData>,
    /// Content types a PUT/POST route accepts. Empty means "derive from the
    /// schema media type".
    pub requested_content_types: Vec<String>,
}

impl RouteContext {
    /// Context used by configuration-driven synthesis.
    #[must_use]
    pub fn for_configuration() -> Self {
        Self {
            use_v2_errors: true,
            ..Self::default()
        }
    }

    /// Whether a query-string filter group was projected for `name`.
    #[must_use]
    pub fn has_query_name(&self, name: &str) -> bool {
        self.query_names.contains_key(name)
    }
}

/// Component schema name prefix for a resource and optional route template.
///
/// Without a template the prefix is `{resource}_`. With one, slashes become
/// underscores and braces are dropped, unless the resource is an alternate
/// view, in which case it is `{resource}_{parent}_`.
#[must_use]
pub fn schema_prefix(config: &ApiConfiguration, route_template: &str) -> String {
    if route_template.is_empty() {
        return format!("{}_", config.resource_name);
    }
    if !config.parent_resource_name.is_empty() {
        return format!("{}_{}_", config.resource_name, config.parent_resource_name);
    }
    let flattened: String = route_template
        .replace('/', "_")
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .collect();
    format!("{flattened}_")
}

/// Full component schema name: `{prefix}{verb}_{kind}`.
#[must_use]
pub fn component_name(prefix: &str, verb: &str, kind: &str) -> String {
    format!("{prefix}{verb}_{kind}")
}
