//! Resource discovery: the representations every Ethos resource answers to.
//!
//! Two passes feed the result. The route walk covers Ethos and
//! Ethos-enabled routes in the catalog; the configuration pass adds
//! specification-based resources from extensible configurations that list
//! supported methods. Entries are grouped per resource name and sorted.

use std::cmp::Ordering;

use colleague_metadata_core::version::{compare_versions, extract_version, major_version};
use colleague_metadata_core::{
    ApiConfigurationSource, Catalog, DeprecatedResource, DeprecationNotice, ExtensibleData,
    RouteDescriptor,
};
use serde::Serialize;

use crate::projector::SchemaProjector;

/// Media type of the bulk request representation.
pub const BULK_REQUEST_MEDIA_TYPE: &str =
    "application/vnd.hedtech.integration.bulk-requests.v1.0.0+json";

const INTEGRATION_MEDIA_FORMAT: &str = "application/vnd.hedtech.integration";
const APPLICATION_JSON: &str = "application/json";
const CRITERIA_GROUP: &str = "criteria";

const GET: &str = "get";
const GET_ALL: &str = "get_all";
const GET_ID: &str = "get_id";
const POST_QAPI: &str = "post_qapi";
const POST: &str = "post";
const PAGING_PATTERN: &str = "paging";
const BATCH_PATTERN: &str = "batch";

const VERSIONED_METHODS: [&str; 6] = ["put", "post", "get", "get_all", "get_id", "post_qapi"];
const VERSIONLESS_METHODS: [&str; 5] = ["get", "get_all", "get_id", "post_qapi", "delete"];

/// A resource and its representations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResource {
    /// Resource name (`persons`).
    pub name: String,
    /// Representations in discovery order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub representations: Vec<Representation>,
}

/// One media type of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Representation {
    /// Media type.
    #[serde(rename = "x-media-type")]
    pub x_media_type: String,
    /// Lower-cased methods (`get`, `put` ...).
    pub methods: Vec<String>,
    /// Dotted filter paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<String>>,
    /// Named queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_queries: Option<Vec<NamedQuery>>,
    /// Deprecation notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_notice: Option<DeprecationNotice>,
    /// Version number (`12.1.0`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_number: Option<String>,
    /// Customization flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customizations: Option<Customizations>,
    /// Ways to retrieve the whole collection.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub get_all_patterns: Vec<GetAllPattern>,
}

/// A named query and the filters it accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamedQuery {
    /// Query name.
    pub name: String,
    /// Dotted filter paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<String>>,
}

/// Customizations applied to a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customizations {
    /// Resource defined by the client.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_custom_resource: bool,
    /// Extended properties are configured.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub has_extended_properties: bool,
    /// Data privacy rules apply.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub has_privacy_rules: bool,
}

/// A way to page through or batch the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetAllPattern {
    /// `paging` or `batch`.
    pub name: String,
    /// `get` or `post`.
    pub method: String,
    /// Media type to request.
    #[serde(rename = "x-media-type")]
    pub x_media_type: String,
}

/// Walks the catalog and configuration source for resource representations.
#[derive(Clone, Copy)]
pub struct ResourceDiscovery<'a> {
    catalog: &'a Catalog,
    source: &'a dyn ApiConfigurationSource,
    bulk_load_supported: bool,
}

impl std::fmt::Debug for ResourceDiscovery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDiscovery")
            .field("routes", &self.catalog.routes.len())
            .field("bulk_load_supported", &self.bulk_load_supported)
            .finish_non_exhaustive()
    }
}

impl<'a> ResourceDiscovery<'a> {
    /// Discovery over `catalog` routes and `source` configurations.
    #[must_use]
    pub fn new(catalog: &'a Catalog, source: &'a dyn ApiConfigurationSource) -> Self {
        Self {
            catalog,
            source,
            bulk_load_supported: false,
        }
    }

    /// Whether the client supports bulk loads. Bulk representations and
    /// `batch` patterns are only listed when it does.
    #[must_use]
    pub const fn with_bulk_load_supported(mut self, supported: bool) -> Self {
        self.bulk_load_supported = supported;
        self
    }

    /// Discover every resource, reading deprecations from the source.
    #[must_use]
    pub fn discover(&self) -> Vec<ApiResource> {
        let deprecated = self.source.deprecated_resources().unwrap_or_else(|err| {
            tracing::error!(error = %err, "deprecated resources unavailable");
            Vec::new()
        });
        self.discover_with(&deprecated)
    }

    /// Discover every resource using an already loaded deprecation list.
    #[must_use]
    pub fn discover_with(&self, deprecated: &[DeprecatedResource]) -> Vec<ApiResource> {
        let configurations = self.source.all_extended_configurations().unwrap_or_else(|err| {
            tracing::error!(error = %err, "extended configurations unavailable");
            Vec::new()
        });

        let mut resources: Vec<ApiResource> = Vec::new();
        for route in self.catalog.routes.iter().filter(|r| r.is_ethos()) {
            self.walk_route(route, deprecated, &configurations, &mut resources);
        }
        for configuration in configurations
            .iter()
            .filter(|c| !c.http_methods_supported.is_empty())
        {
            self.add_configured(configuration, &mut resources);
        }

        resources.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(resources = resources.len(), "resources discovered");
        resources
    }

    fn walk_route(
        &self,
        route: &RouteDescriptor,
        deprecated: &[DeprecatedResource],
        configurations: &[ExtensibleData],
        resources: &mut Vec<ApiResource>,
    ) {
        let Some(hv) = &route.header_version else {
            return;
        };
        let api_name = route.api_name();
        let method = route.http_method().unwrap_or_default().to_lowercase();

        let segments = route.template.split('/').filter(|s| !s.is_empty()).count();
        if method == GET && segments > 1 && !hv.administrative {
            return;
        }

        let mut media_types = hv.media_types.clone();
        if method == "put" || method == POST {
            let content_types = self.content_types(route);
            if !content_types.is_empty() {
                media_types = content_types;
            }
        }

        let mut notice = deprecated
            .iter()
            .find(|d| d.name == api_name)
            .and_then(|d| {
                d.representations
                    .iter()
                    .rev()
                    .find(|r| media_types.contains(&r.x_media_type))
            })
            .map(|r| r.deprecation_notice.clone());

        let (filters, named_queries) = if method == GET {
            self.route_filters(route, &media_types, hv.ethos_enabled)
        } else {
            (Vec::new(), Vec::new())
        };

        let index = resource_index(resources, &api_name);
        let representations = &mut resources[index].representations;

        if self.bulk_load_supported
            && hv.bulk_supported
            && !representations
                .iter()
                .any(|r| r.x_media_type.eq_ignore_ascii_case(BULK_REQUEST_MEDIA_TYPE))
        {
            representations.push(Representation {
                x_media_type: BULK_REQUEST_MEDIA_TYPE.to_string(),
                methods: vec![GET.to_string(), POST.to_string()],
                ..Representation::default()
            });
        }

        let non_integration = media_types
            .first()
            .is_some_and(|m| !m.contains(INTEGRATION_MEDIA_FORMAT));
        if hv.satisfy_versionless || method == "delete" || non_integration {
            let matching: Vec<&ExtensibleData> = configurations
                .iter()
                .filter(|c| c.api_resource_name.eq_ignore_ascii_case(&api_name))
                .collect();
            let mut customizations = None;
            if !matching.is_empty() {
                if hv.satisfy_versionless {
                    let default = default_version(configurations, &api_name);
                    let config = matching
                        .iter()
                        .find(|c| c.api_version_number.is_empty() || c.api_version_number == default);
                    if let Some(config) = config {
                        notice = notice.or_else(|| configuration_notice(config));
                    }
                }
                customizations = Some(Customizations {
                    has_extended_properties: true,
                    ..Customizations::default()
                });
            }
            let customizations = self.with_privacy(customizations, &api_name);

            match representations
                .iter_mut()
                .find(|r| r.x_media_type.contains(APPLICATION_JSON))
            {
                None => {
                    let mut representation = Representation {
                        x_media_type: APPLICATION_JSON.to_string(),
                        methods: vec![method.clone()],
                        filters: non_empty(filters.clone()),
                        named_queries: non_empty(named_queries.clone()),
                        deprecation_notice: notice.clone(),
                        customizations,
                        ..Representation::default()
                    };
                    self.insert_get_all_patterns(&mut representation, APPLICATION_JSON, hv.bulk_supported);
                    representations.push(representation);
                }
                Some(existing) if !existing.methods.contains(&method) => {
                    existing.methods.push(method.clone());
                    self.insert_get_all_patterns(existing, APPLICATION_JSON, hv.bulk_supported);
                }
                Some(_) => {}
            }
        }

        for media_type in media_types.iter().filter(|m| m.contains(INTEGRATION_MEDIA_FORMAT)) {
            let version = extract_version(media_type);
            match representations
                .iter()
                .position(|r| r.x_media_type.eq_ignore_ascii_case(media_type))
            {
                None => {
                    let major = major_version(&version);
                    let mut customizations = None;
                    let config = configurations.iter().find(|c| {
                        c.api_resource_name.eq_ignore_ascii_case(&api_name)
                            && (c.api_version_number.is_empty()
                                || c.api_version_number == version
                                || c.api_version_number == major)
                    });
                    if let Some(config) = config {
                        notice = notice.or_else(|| configuration_notice(config));
                        customizations = Some(Customizations {
                            has_extended_properties: true,
                            ..Customizations::default()
                        });
                    }
                    let mut representation = Representation {
                        x_media_type: media_type.clone(),
                        methods: vec![method.clone()],
                        filters: non_empty(filters.clone()),
                        named_queries: non_empty(named_queries.clone()),
                        deprecation_notice: notice.clone(),
                        version_number: Some(version.clone()),
                        customizations: self.with_privacy(customizations, &api_name),
                        ..Representation::default()
                    };
                    self.insert_get_all_patterns(&mut representation, media_type, hv.bulk_supported);
                    add_major_version(representations, &representation, false);
                    representations.push(representation);
                }
                Some(index) if !representations[index].methods.contains(&method) => {
                    let existing = &mut representations[index];
                    if !filters.is_empty() {
                        existing.filters = Some(filters.clone());
                    }
                    existing.methods.push(method.clone());
                    self.insert_get_all_patterns(existing, media_type, hv.bulk_supported);
                    let snapshot = existing.clone();
                    add_major_version(representations, &snapshot, false);
                }
                Some(index) => {
                    if !filters.is_empty() {
                        representations[index].filters = Some(filters.clone());
                    }
                }
            }
        }
    }

    fn add_configured(&self, configuration: &ExtensibleData, resources: &mut Vec<ApiResource>) {
        let api_name = if configuration.parent_api.is_empty() {
            configuration.api_resource_name.clone()
        } else {
            configuration.parent_api.clone()
        };
        let notice = configuration_notice(configuration);

        let mut filters = Vec::new();
        let mut named_queries = Vec::new();
        for row in &configuration.extended_data_filter_list {
            let path = dotted_path(&row.full_json_path());
            if row.named_query {
                named_queries.push(NamedQuery {
                    name: row.column_name.clone(),
                    filters: Some(vec![path]),
                });
            } else {
                filters.push(path);
            }
        }

        let customizations = configuration.is_custom_resource.then(|| Customizations {
            is_custom_resource: true,
            ..Customizations::default()
        });
        let customizations = self.with_privacy(customizations, &api_name);
        let version_number =
            Some(configuration.api_version_number.clone()).filter(|v| !v.is_empty());

        let index = resource_index(resources, &api_name);
        let representations = &mut resources[index].representations;

        match representations
            .iter_mut()
            .find(|r| r.x_media_type.contains(APPLICATION_JSON))
        {
            None => {
                let supported = normalize_methods(
                    &configuration.http_methods_supported,
                    &VERSIONLESS_METHODS,
                    &filters,
                );
                let mut representation = Representation {
                    x_media_type: APPLICATION_JSON.to_string(),
                    methods: supported.methods,
                    filters: supported.filters,
                    named_queries: non_empty(named_queries.clone()),
                    deprecation_notice: notice.clone(),
                    version_number: version_number.clone(),
                    customizations: customizations.clone(),
                    ..Representation::default()
                };
                if supported.get_all {
                    self.insert_get_all_patterns(&mut representation, APPLICATION_JSON, false);
                }
                representations.push(representation);
            }
            // Alternate views never become the versionless representation.
            Some(existing) if configuration.parent_api.is_empty() => {
                let current = existing.version_number.as_deref().unwrap_or_default();
                if compare_versions(&configuration.api_version_number, current) == Ordering::Greater {
                    existing.filters =
                        non_empty(filters.iter().filter(|f| !f.starts_with("id.")).cloned().collect());
                    existing.named_queries = non_empty(named_queries.clone());
                    existing.deprecation_notice.clone_from(&notice);
                    existing.version_number.clone_from(&version_number);
                    existing.customizations.clone_from(&customizations);
                }
            }
            Some(_) => {}
        }

        let media_type = &configuration.extended_schema_type;
        if media_type.is_empty() {
            tracing::error!(resource = %api_name, "configured resource has no schema media type");
            return;
        }
        let supported = normalize_methods(
            &configuration.http_methods_supported,
            &VERSIONED_METHODS,
            &filters,
        );
        let mut representation = Representation {
            x_media_type: media_type.clone(),
            methods: supported.methods,
            filters: supported.filters,
            named_queries: non_empty(named_queries),
            deprecation_notice: notice,
            version_number,
            customizations,
            ..Representation::default()
        };
        if supported.get_all {
            self.insert_get_all_patterns(&mut representation, media_type, false);
        }
        let snapshot = representation.clone();
        representations.push(representation);
        add_major_version(representations, &snapshot, configuration.is_custom_resource);
    }

    fn content_types(&self, route: &RouteDescriptor) -> Vec<String> {
        let mut content_types = route.content_types.clone();
        let action = self
            .catalog
            .controller(&route.controller)
            .and_then(|c| c.find_action(&route.action));
        if let Some(action) = action {
            for content_type in action.content_types() {
                if !content_types.contains(&content_type) {
                    content_types.push(content_type);
                }
            }
        }
        content_types
    }

    fn route_filters(
        &self,
        route: &RouteDescriptor,
        media_types: &[String],
        ethos_enabled: bool,
    ) -> (Vec<String>, Vec<NamedQuery>) {
        let Some(controller) = self.catalog.controller(&route.controller) else {
            return (Vec::new(), Vec::new());
        };

        let legacy = media_types
            .first()
            .is_some_and(|m| m.contains("v6") || m.contains("v7"));
        if legacy {
            return self.legacy_filters(route);
        }
        if ethos_enabled {
            return (Vec::new(), Vec::new());
        }

        let Some(action) = controller.find_action_by_prefix(&route.action) else {
            return (Vec::new(), Vec::new());
        };
        let projector = SchemaProjector::new(self.catalog);
        let mut filters = Vec::new();
        let mut named_queries = Vec::new();
        for (group, type_name) in action.query_string_filters() {
            let paths = projector.filter_properties(group, type_name);
            if group == CRITERIA_GROUP {
                if filters.is_empty() {
                    filters = paths;
                }
            } else {
                named_queries.push(NamedQuery {
                    name: group.to_string(),
                    filters: non_empty(paths),
                });
            }
        }
        (filters, named_queries)
    }

    fn legacy_filters(&self, route: &RouteDescriptor) -> (Vec<String>, Vec<NamedQuery>) {
        let Some(query_filters) = &route.query_filters else {
            return (Vec::new(), Vec::new());
        };
        let keywords = &self.catalog.query_keywords;
        let accepted = |q: &&String| !q.is_empty() && !keywords.contains(q);
        let filters = query_filters.params.iter().filter(accepted).cloned().collect();
        let named_queries = query_filters
            .named_queries
            .iter()
            .filter(accepted)
            .map(|q| NamedQuery {
                name: q.clone(),
                filters: Some(vec![q.clone()]),
            })
            .collect();
        (filters, named_queries)
    }

    fn with_privacy(&self, customizations: Option<Customizations>, api_name: &str) -> Option<Customizations> {
        if !self.source.has_privacy_rules(api_name) {
            return customizations;
        }
        let mut customizations = customizations.unwrap_or_default();
        customizations.has_privacy_rules = true;
        Some(customizations)
    }

    fn insert_get_all_patterns(&self, representation: &mut Representation, media_type: &str, bulk_on_route: bool) {
        if !representation.methods.iter().any(|m| m == GET || m == GET_ALL) {
            return;
        }
        let patterns = &mut representation.get_all_patterns;
        if !patterns.iter().any(|p| p.name.eq_ignore_ascii_case(PAGING_PATTERN)) {
            patterns.push(GetAllPattern {
                name: PAGING_PATTERN.to_string(),
                method: GET.to_string(),
                x_media_type: media_type.to_string(),
            });
        }
        if self.bulk_load_supported
            && bulk_on_route
            && !patterns.iter().any(|p| p.name.eq_ignore_ascii_case(BATCH_PATTERN))
        {
            patterns.push(GetAllPattern {
                name: BATCH_PATTERN.to_string(),
                method: POST.to_string(),
                x_media_type: BULK_REQUEST_MEDIA_TYPE.to_string(),
            });
        }
    }
}

/// Methods a configuration supports, collapsed to the discovery vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SupportedMethods {
    methods: Vec<String>,
    get_all: bool,
    filters: Option<Vec<String>>,
}

/// Collapse `get_all`, `get_id` and `post_qapi` into `get`.
///
/// A configuration supporting only `get_id` keeps its `id.` filters with
/// the prefix removed. Without any collection method no filters are listed.
fn normalize_methods(declared: &[String], allowed: &[&str], filters: &[String]) -> SupportedMethods {
    let mut methods: Vec<String> = declared
        .iter()
        .map(|m| m.to_lowercase())
        .filter(|m| allowed.contains(&m.as_str()))
        .collect();
    let has = |methods: &[String], name: &str| methods.iter().any(|m| m == name);
    let get_all = has(&methods, GET_ALL) || has(&methods, POST_QAPI) || has(&methods, GET);

    let mut filters: Vec<String> = filters.to_vec();
    if !has(&methods, GET) && !has(&methods, GET_ALL) && !has(&methods, POST_QAPI) {
        filters = if has(&methods, GET_ID) {
            filters
                .iter()
                .filter(|f| f.starts_with("id."))
                .filter_map(|f| f.split('.').nth(1))
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
    }
    if [GET_ALL, GET_ID, POST_QAPI].iter().any(|m| has(&methods, *m)) && !has(&methods, GET) {
        methods.push(GET.to_string());
    }
    methods.retain(|m| m != GET_ID && m != GET_ALL && m != POST_QAPI);

    filters.retain(|f| !f.starts_with("id."));
    SupportedMethods {
        methods,
        get_all,
        filters: if get_all { non_empty(filters) } else { None },
    }
}

/// Register the major-version twin of `representation` (`v12` for
/// `v12.1.0`) unless it is already listed. `-beta` is dropped.
fn add_major_version(representations: &mut Vec<Representation>, representation: &Representation, is_custom: bool) {
    let Some(version) = representation.version_number.as_deref().filter(|v| !v.is_empty()) else {
        return;
    };
    if representation.x_media_type.is_empty() {
        return;
    }
    let segments: Option<Vec<u32>> = version.split('.').map(|s| s.parse().ok()).collect();
    let Some(segments) = segments else {
        tracing::error!(version, "cannot derive a major version");
        return;
    };
    if segments.len() < 2 {
        return;
    }
    let major = segments[0].to_string();
    let to_major = |media_type: &str| media_type.replace(version, &major).replace("-beta", "");

    let major_media_type = to_major(&representation.x_media_type);
    if representations.iter().any(|r| r.x_media_type == major_media_type) {
        return;
    }

    let mut twin = representation.clone();
    twin.x_media_type = major_media_type;
    if is_custom {
        twin.customizations.get_or_insert_with(Customizations::default).is_custom_resource = true;
    }
    for pattern in &mut twin.get_all_patterns {
        if pattern.name == PAGING_PATTERN {
            pattern.x_media_type = to_major(&pattern.x_media_type);
        }
    }
    representations.push(twin);
}

/// Latest configured version of `resource` by major number, or `1.0.0`.
fn default_version(configurations: &[ExtensibleData], resource: &str) -> String {
    let mut versions: Vec<&str> = configurations
        .iter()
        .filter(|c| c.api_resource_name.eq_ignore_ascii_case(resource))
        .map(|c| c.api_version_number.as_str())
        .filter(|v| !v.is_empty())
        .collect();
    versions.sort_by(|a, b| compare_versions(major_version(a), major_version(b)));
    versions.last().map_or_else(|| "1.0.0".to_string(), |v| (*v).to_string())
}

fn configuration_notice(configuration: &ExtensibleData) -> Option<DeprecationNotice> {
    if configuration.deprecation_notice.is_empty() {
        return None;
    }
    let date = |value: &str| Some(value.to_string()).filter(|v| !v.is_empty());
    Some(DeprecationNotice {
        deprecated_on: date(&configuration.deprecation_date),
        sunset_on: date(&configuration.sunset_date),
        description: Some(configuration.deprecation_notice.clone()),
    })
}

fn resource_index(resources: &mut Vec<ApiResource>, name: &str) -> usize {
    if let Some(index) = resources.iter().position(|r| r.name.eq_ignore_ascii_case(name)) {
        return index;
    }
    resources.push(ApiResource {
        name: name.to_string(),
        representations: Vec::new(),
    });
    resources.len() - 1
}

fn dotted_path(path: &str) -> String {
    path.replace('/', ".").replace("[]", "")
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}
