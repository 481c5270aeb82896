//! Route-driven and configuration-driven document synthesis.
//!
//! Routes declared in the catalog are documented one at a time: each route
//! contributes a single operation to the document of its
//! `(api type, version, title)`, creating the document on first sight.
//! Resources without routes fall back to their extensible configuration.

use std::collections::BTreeMap;

use colleague_metadata_core::version::major_version;
use colleague_metadata_core::{
    module_domain_code, ActionDescriptor, ApiConfiguration, ApiConfigurationSource, Catalog,
    ExtensibleData, FilterRow, RouteDescriptor, SupportedMethod, DEFAULT_PAGE_LIMIT,
};

use crate::components::build_components;
use crate::context::RouteContext;
use crate::document::{build_info, current_license, servers, update_info};
use crate::error::Result;
use crate::media::RouteMedia;
use crate::model::OpenApiDocument;
use crate::operations::V2_ERROR_MEDIA_TYPE;
use crate::paths::{add_route_path, configuration_paths};
use crate::projector::SchemaProjector;

const OBSOLETE_DEFAULT: &str = "Obsolete version, use a more recent version instead.";
const ROUTE_PARAMETER_TEXT: &str =
    "An Identifier for the resource or other required parameter used for resource designation.";

/// Builds OpenAPI documents from the catalog and a configuration source.
#[derive(Clone, Copy)]
pub struct Synthesizer<'a> {
    catalog: &'a Catalog,
    source: &'a dyn ApiConfigurationSource,
    page_limit: u32,
}

impl std::fmt::Debug for Synthesizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("routes", &self.catalog.routes.len())
            .field("page_limit", &self.page_limit)
            .finish_non_exhaustive()
    }
}

impl<'a> Synthesizer<'a> {
    /// A synthesizer reading routes and types from `catalog` and resource
    /// configurations from `source`.
    #[must_use]
    pub fn new(catalog: &'a Catalog, source: &'a dyn ApiConfigurationSource) -> Self {
        Self {
            catalog,
            source,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// A synthesizer whose catalog is also its configuration source.
    #[must_use]
    pub fn from_catalog(catalog: &'a Catalog) -> Self {
        Self::new(catalog, catalog)
    }

    /// Page limit applied to routes whose paging filter declares none.
    #[must_use]
    pub const fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// The catalog routes and types are read from.
    #[must_use]
    pub const fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// The configuration source.
    #[must_use]
    pub fn source(&self) -> &'a dyn ApiConfigurationSource {
        self.source
    }

    /// Every document describing `resource`.
    ///
    /// Routes whose API name is `resource` are documented when there are
    /// any; otherwise the resource's extensible configuration is.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration source fails during
    /// configuration-driven synthesis.
    pub fn openapi(&self, resource: &str) -> Result<Vec<OpenApiDocument>> {
        let routes = self.catalog.routes_for(resource);
        if routes.is_empty() {
            return self.build_from_configuration(resource);
        }
        Ok(self.build_from_routes(&routes, resource))
    }

    /// Document `routes` as `resource`.
    ///
    /// Routes that cannot be documented are skipped; failures are logged.
    #[must_use]
    pub fn build_from_routes(
        &self,
        routes: &[&RouteDescriptor],
        resource: &str,
    ) -> Vec<OpenApiDocument> {
        let mut documents = Vec::new();
        for route in routes {
            if let Err(err) = self.document_route(route, resource, &mut documents) {
                tracing::error!(route = %route.template, error = %err, "route skipped");
            }
        }
        documents
    }

    /// One document per configured version of `resource`.
    ///
    /// An unconfigured resource, or one without versions, yields nothing.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration source fails.
    pub fn build_from_configuration(&self, resource: &str) -> Result<Vec<OpenApiDocument>> {
        let Some(config) = self.source.configuration(resource)? else {
            tracing::debug!(resource, "no configuration");
            return Ok(Vec::new());
        };
        let versions = self.source.version_configurations(resource)?;
        let context = RouteContext::for_configuration();
        Ok(versions
            .iter()
            .map(|version| {
                let mut document = OpenApiDocument::new(build_info(&config, version), servers());
                document.paths = configuration_paths(&config, version, &context);
                document.components = build_components(&config, version, version, &context);
                document
            })
            .collect())
    }

    fn document_route(
        &self,
        route: &RouteDescriptor,
        resource: &str,
        documents: &mut Vec<OpenApiDocument>,
    ) -> Result<()> {
        let template = if route.template.is_empty() {
            resource.to_string()
        } else {
            route.template.clone()
        };
        let api_name = colleague_metadata_core::api_name(&template);

        let Some(mut method) = route.http_method().map(|verb| classify(&template, verb)) else {
            tracing::debug!(route = %template, "no HTTP method; skipped");
            return Ok(());
        };

        let media = RouteMedia::resolve(route);
        if let Some(reason) = media.skip_reason() {
            tracing::debug!(route = %template, %reason, "route skipped");
            return Ok(());
        }

        let mut config = ApiConfiguration {
            resource_name: api_name.clone(),
            parent_resource_name: media.alternate_view(),
            release_status: "R".to_string(),
            api_type: media.api_type.to_string(),
            ..ApiConfiguration::default()
        };

        let Some(controller) = self.catalog.controller(&route.controller) else {
            tracing::debug!(route = %template, controller = %route.controller, "controller not in catalog");
            return Ok(());
        };
        if let Some(docs) = &controller.docs {
            config.description.clone_from(&docs.description);
            config.api_domain.clone_from(&docs.api_domain);
        }
        if config.api_domain.is_empty() && !controller.module.is_empty() {
            config.api_domain = module_domain_code(&controller.module).to_string();
        }
        let Some(action) = controller.find_action(&route.action) else {
            tracing::debug!(route = %template, action = %route.action, "action not in catalog");
            return Ok(());
        };

        let mut context = RouteContext::default();
        if action.forces_get_all() {
            method = "GET_ALL".to_string();
        }
        config.page_limit = Some(action.paging_limit().unwrap_or(self.page_limit));
        context.requested_content_types = action.content_types();
        for content_type in &route.content_types {
            if !context.requested_content_types.contains(content_type) {
                context.requested_content_types.push(content_type.clone());
            }
        }
        context.use_v2_errors = action.error_content_type() == Some(V2_ERROR_MEDIA_TYPE)
            || route.header_version.as_ref().is_some_and(|hv| hv.ethos_enabled);

        let supported = supported_method(&mut config, route, action, &method, &template);
        let version_description = action
            .docs
            .as_ref()
            .map(|d| d.version_description.clone())
            .unwrap_or_default();
        let version_status = action
            .docs
            .as_ref()
            .map(|d| d.version_status.clone())
            .unwrap_or_default();
        let license_name = action
            .docs
            .as_ref()
            .map(|d| d.license.clone())
            .unwrap_or_default();
        config.http_methods = vec![supported];

        let blank = || {
            let mut version =
                ExtensibleData::new(&api_name, &media.version, &media.x_media_type, &template);
            version.description.clone_from(&version_description);
            version.version_release_status.clone_from(&version_status);
            version
        };

        let projector = SchemaProjector::new(self.catalog);
        let mut response = blank();
        projector.project_response(action, &mut response);
        self.copy_rows_to_filters(&mut response, &api_name, &media.version)?;

        let mut request = blank();
        if ["QAPI", "PUT", "POST"].iter().any(|p| method.starts_with(p)) {
            projector.project_request(action, &mut request);
            self.copy_rows_to_filters(&mut request, &api_name, &media.version)?;
        }

        let mut groups: BTreeMap<&str, &str> = BTreeMap::new();
        for (group, type_name) in action.query_string_filters() {
            groups.entry(group).or_insert(type_name);
        }
        for (group, type_name) in groups {
            let mut query = blank();
            projector.project_type(type_name, true, &mut query);
            self.copy_rows_to_filters(&mut query, resource, &media.version)?;
            if !query.extended_data_filter_list.is_empty() {
                context.query_names.insert(group.to_string(), query);
            }
        }

        if response.extended_data_list.is_empty() {
            tracing::debug!(route = %template, "response has no properties; no document");
            return Ok(());
        }

        let existing = documents.iter().position(|doc| {
            doc.api_type()
                .is_some_and(|t| t.eq_ignore_ascii_case(&config.api_type))
                && doc.info.version == response.api_version_number
                && doc.info.title.eq_ignore_ascii_case(&api_name)
        });
        let mut document = match existing {
            Some(index) => documents.remove(index),
            None => OpenApiDocument::new(Default::default(), servers()),
        };
        let info = std::mem::take(&mut document.info);
        document.info = update_info(&config, &response, Some(info));
        document.info.license = Some(current_license(&license_name));

        add_route_path(&mut document, &config, &response, &request, &context, &method);
        let components = build_components(&config, &response, &request, &context);
        document.components.merge_missing(components);
        documents.push(document);
        Ok(())
    }

    /// Copy projected rows into the filter list.
    ///
    /// Versions exposing an `id` or `code` property first receive column
    /// defaults and the rows configured for the matching resource version.
    /// Columns without a usage, or with usage `I`, become inquiry-only.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration source fails.
    pub fn copy_rows_to_filters(
        &self,
        version: &mut ExtensibleData,
        resource: &str,
        version_only: &str,
    ) -> Result<()> {
        if version.extended_data_list.is_empty() {
            return Ok(());
        }
        let has_key = version
            .extended_data_list
            .iter()
            .any(|row| row.json_title.eq_ignore_ascii_case("id") || row.json_title.eq_ignore_ascii_case("code"));
        if has_key {
            let rows = std::mem::take(&mut version.extended_data_list);
            version.extended_data_list = self.source.apply_data_row_defaults(rows);
            let major = major_version(version_only);
            for merge in self.source.version_configurations(resource)? {
                let number = merge.api_version_number.as_str();
                if number.is_empty() || number == version_only || number == major {
                    version.extended_data_list.extend(merge.extended_data_list);
                    version.inquiry_fields.extend(merge.inquiry_fields);
                }
            }
        }

        for row in &version.extended_data_list {
            if (row.usage == "I" || row.usage.is_empty()) && !row.column_name.is_empty() {
                version.inquiry_fields.push(row.column_name.clone());
            }
            version.extended_data_filter_list.push(FilterRow::from(row));
        }
        Ok(())
    }
}

/// Method name a route is documented under.
///
/// Single-segment routes that do not write are collections; `qapi/...`
/// routes are query posts; other GET routes are item or collection reads
/// depending on whether the template has a parameter.
fn classify(template: &str, verb: String) -> String {
    let segments = template.split('/').count();
    if segments == 1 {
        if matches!(verb.as_str(), "POST" | "PUT" | "DELETE") {
            return verb;
        }
        return "GET_ALL".to_string();
    }
    let first = template.split('/').next().unwrap_or_default();
    if first.eq_ignore_ascii_case("qapi") {
        return "QAPI_POST".to_string();
    }
    match verb.as_str() {
        "GET" if template.contains('{') => "GET_ID".to_string(),
        "GET" => "GET_ALL".to_string(),
        _ => verb,
    }
}

/// Fold action documentation into `config` and build the route's method.
fn supported_method(
    config: &mut ApiConfiguration,
    route: &RouteDescriptor,
    action: &ActionDescriptor,
    method: &str,
    template: &str,
) -> SupportedMethod {
    let mut supported = SupportedMethod {
        method: method.to_string(),
        route_template: template.to_string(),
        ..SupportedMethod::default()
    };
    let mut license = String::new();
    let mut note = String::new();

    if let Some(docs) = &action.docs {
        if !docs.api_domain.is_empty() {
            config.api_domain.clone_from(&docs.api_domain);
        }
        if !docs.api_type.is_empty() {
            config.api_type.clone_from(&docs.api_type);
        }
        config.audience.clone_from(&docs.audience);
        config.deprecated_on.clone_from(&docs.deprecated_on);
        config.sunset_on.clone_from(&docs.sunset_on);
        supported.permission.clone_from(&docs.permission);
        supported.summary.clone_from(&docs.summary);
        supported.returns.clone_from(&docs.returns);
        supported.description.clone_from(&docs.description);
        supported.exceptions.clone_from(&docs.exceptions);
        supported.arguments = docs
            .arguments
            .iter()
            .map(|arg| (arg.name.clone(), arg.description.clone()))
            .collect();
        license.clone_from(&docs.license);
        note.clone_from(&docs.note);
    }

    for parameter in route.parameters() {
        if !supported.arguments.iter().any(|(name, _)| *name == parameter) {
            supported
                .arguments
                .push((parameter, ROUTE_PARAMETER_TEXT.to_string()));
        }
    }

    if let Some(message) = &action.obsolete {
        let message = if message.is_empty() { OBSOLETE_DEFAULT } else { message };
        supported.description = format!("<b>Warning:</b> {message}\n\n{}", supported.description);
    }
    if !license.is_empty() {
        supported.description = format!(
            "{}\n\n<b>License Name</b>\n\n{license}",
            supported.description
        );
    }
    if !note.is_empty() {
        supported.description = format!("{}\n\n<b>Note:</b>\n\n{note}", supported.description);
    }
    supported
}
