//! Component schemas, error schemas and security schemes of one resource
//! version.

use colleague_metadata_core::{ApiConfiguration, ExtensibleData};

use crate::context::{component_name, schema_prefix, RouteContext};
use crate::model::{Components, ParameterLocation, Schema, SecurityScheme};
use crate::operations::{BASIC_SCHEME, BEARER_SCHEME};
use crate::schema::{filter_schema, id_schema, main_schema, named_query_schema, SchemaUse};

/// Build the components of a resource version.
///
/// `response` drives read schemas, `request` drives request bodies and
/// filters. Schemas are added once per name; the first method to claim a
/// name wins. Identifier, query-name and named-query schemas use the prefix
/// of the last configured method.
#[must_use]
pub fn build_components(
    config: &ApiConfiguration,
    response: &ExtensibleData,
    request: &ExtensibleData,
    context: &RouteContext,
) -> Components {
    let mut components = Components::default();
    let schemas = &mut components.schemas;
    let mut prefix = schema_prefix(config, "");
    let mut filter_supported = false;

    for method in &config.http_methods {
        prefix = schema_prefix(config, &method.route_template);
        if method.method.is_empty() {
            continue;
        }
        if method.method.contains("QAPI") {
            let query_request = component_name(&prefix, "query", "request");
            if !schemas.contains_key(&query_request) {
                let schema = if let Some(criteria) = context.query_names.get("criteria") {
                    filter_schema(config, criteria, "criteria")
                } else if config.is_ethos() {
                    filter_schema(config, request, "criteria")
                } else {
                    filter_schema(config, request, "")
                };
                schemas.insert(query_request, schema);
                filter_supported = true;
            }
            schemas
                .entry(component_name(&prefix, "query", "response"))
                .or_insert_with(|| main_schema(config, response, SchemaUse::Read));
            continue;
        }

        let verb = method
            .method
            .split('_')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match verb.as_str() {
            "get" => {
                let lower = method.method.to_lowercase();
                if matches!(lower.as_str(), "get" | "get_id" | "get_all") {
                    schemas
                        .entry(component_name(&prefix, "get", "response"))
                        .or_insert_with(|| main_schema(config, response, SchemaUse::Read));
                }
                if lower == "get" || lower == "get_all" {
                    filter_supported = true;
                }
            }
            "put" | "post" => {
                let usage = if verb == "put" { SchemaUse::Put } else { SchemaUse::Post };
                schemas
                    .entry(component_name(&prefix, &verb, "request"))
                    .or_insert_with(|| main_schema(config, request, usage));
                schemas
                    .entry(component_name(&prefix, &verb, "response"))
                    .or_insert_with(|| main_schema(config, response, SchemaUse::Read));
            }
            _ => {}
        }
    }

    if config.is_composite_key() && !config.get_all_only() && !config.post_only() {
        schemas.insert(
            component_name(&prefix, "id", "parameter"),
            id_schema(config, response),
        );
    }

    let query_request = component_name(&prefix, "query", "request");
    if !context.query_names.is_empty() {
        for (name, query) in &context.query_names {
            if query.extended_data_filter_list.is_empty() {
                continue;
            }
            let key = if name == "criteria" {
                query_request.clone()
            } else {
                component_name(&prefix, name, "parameter")
            };
            schemas
                .entry(key)
                .or_insert_with(|| filter_schema(config, query, name));
        }
    } else if filter_supported && !schemas.contains_key(&query_request) {
        let schema = filter_schema(config, request, "criteria");
        if !schema.properties.is_empty() {
            schemas.insert(query_request, schema);
        }
    }

    if response.extended_data_filter_list.iter().any(|f| f.named_query) {
        schemas.insert(
            component_name(&prefix, "namedQuery", "parameter"),
            named_query_schema(response),
        );
    }

    if context.use_v2_errors {
        schemas.insert("errors_2_0_0".to_string(), v2_error_schema());
    } else {
        schemas.insert("errors".to_string(), v1_error_schema());
    }

    for (name, scheme) in [(BEARER_SCHEME, "bearer"), (BASIC_SCHEME, "basic")] {
        components.security_schemes.insert(
            name.to_string(),
            SecurityScheme {
                scheme_type: "http".to_string(),
                name: Some(name.to_string()),
                location: Some(ParameterLocation::Header),
                scheme: Some(scheme.to_string()),
            },
        );
    }
    components
}

fn v2_error_schema() -> Schema {
    let mut item = Schema::object();
    for (name, description) in [
        ("id", "The global identifier of the resource in error."),
        (
            "sourceId",
            "The source applications data reference identifier for the primary data entity used to create the resource. This is useful for referencing the source item through the applications administrative user interface.",
        ),
        ("code", "The error message code used to describe the error details."),
        ("description", "The error description used to describe the error details."),
        ("message", "The detailed actionable error message."),
    ] {
        item.properties
            .insert(name.to_string(), Schema::typed("string").described(description));
    }
    let mut schema = Schema::object();
    schema.required.insert("errors".to_string());
    schema
        .properties
        .insert("errors".to_string(), Schema::array_of(item));
    schema
}

fn v1_error_schema() -> Schema {
    let mut schema = Schema::object();
    schema.required.insert("message".to_string());
    schema
        .properties
        .insert("message".to_string(), Schema::typed("string"));
    schema
        .properties
        .insert("conflict".to_string(), Schema::typed("string"));
    schema
        .properties
        .insert("isEmpty".to_string(), Schema::typed("boolean"));
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use colleague_metadata_core::{ExtensibleDataRow, FilterRow, SupportedMethod};
    use pretty_assertions::assert_eq;

    fn method(name: &str, template: &str) -> SupportedMethod {
        SupportedMethod {
            method: name.to_string(),
            route_template: template.to_string(),
            ..SupportedMethod::default()
        }
    }

    fn version() -> ExtensibleData {
        let mut version = ExtensibleData::new("persons", "12.0.0", "application/json", "persons");
        let mut row = ExtensibleDataRow::new("LAST.NAME", "PERSON", "lastName", "/", "string", Some(30));
        row.filter_names = vec!["criteria".to_string()];
        version.extended_data_filter_list.push(FilterRow::from(&row));
        version.extended_data_list.push(row);
        version
    }

    fn names(components: &Components) -> Vec<&str> {
        components.schemas.keys().map(String::as_str).collect()
    }

    #[test]
    fn reads_and_writes_get_their_schemas() {
        let config = ApiConfiguration {
            resource_name: "persons".to_string(),
            api_type: "ethos".to_string(),
            http_methods: vec![method("GET_ALL", ""), method("PUT", ""), method("POST", "")],
            ..ApiConfiguration::default()
        };
        let version = version();
        let components = build_components(&config, &version, &version, &RouteContext::default());
        assert_eq!(
            names(&components),
            vec![
                "errors",
                "persons_get_response",
                "persons_post_request",
                "persons_post_response",
                "persons_put_request",
                "persons_put_response",
                "persons_query_request",
            ]
        );
        assert_eq!(
            components.security_schemes.keys().collect::<Vec<_>>(),
            vec!["BasicAuth", "EthosIntegrationBearer"]
        );
    }

    #[test]
    fn qapi_adds_query_schemas_and_v2_errors() {
        let config = ApiConfiguration {
            resource_name: "persons".to_string(),
            api_type: "ethos".to_string(),
            http_methods: vec![method("QAPI_POST", "qapi/persons")],
            ..ApiConfiguration::default()
        };
        let version = version();
        let ctx = RouteContext::for_configuration();
        let components = build_components(&config, &version, &version, &ctx);
        assert_eq!(
            names(&components),
            vec!["errors_2_0_0", "qapi_persons_query_request", "qapi_persons_query_response"]
        );
        let errors = &components.schemas["errors_2_0_0"];
        assert!(errors.required.contains("errors"));
    }

    #[test]
    fn query_names_become_parameter_schemas() {
        let config = ApiConfiguration {
            resource_name: "persons".to_string(),
            api_type: "ethos".to_string(),
            http_methods: vec![method("GET_ALL", "persons")],
            ..ApiConfiguration::default()
        };
        let version = version();
        let mut ctx = RouteContext::default();
        ctx.query_names.insert("criteria".to_string(), version.clone());
        ctx.query_names.insert("personFilter".to_string(), version.clone());
        ctx.query_names
            .insert("empty".to_string(), ExtensibleData::default());
        let components = build_components(&config, &version, &version, &ctx);
        assert_eq!(
            names(&components),
            vec![
                "errors",
                "persons_get_response",
                "persons_personFilter_parameter",
                "persons_query_request",
            ]
        );
    }

    #[test]
    fn filter_without_properties_is_omitted() {
        let config = ApiConfiguration {
            resource_name: "persons".to_string(),
            api_type: "ethos".to_string(),
            http_methods: vec![method("GET_ALL", "")],
            ..ApiConfiguration::default()
        };
        let version = ExtensibleData::new("persons", "12.0.0", "application/json", "persons");
        let components = build_components(&config, &version, &version, &RouteContext::default());
        assert_eq!(names(&components), vec!["errors", "persons_get_response"]);
    }

    #[test]
    fn composite_keys_and_named_queries() {
        let config = ApiConfiguration {
            resource_name: "x-leave-plans".to_string(),
            api_type: "T".to_string(),
            colleague_key_names: vec!["EMP".to_string(), "PLAN".to_string()],
            http_methods: vec![method("GET", ""), method("DELETE", "")],
            ..ApiConfiguration::default()
        };
        let mut version = version();
        version.extended_data_filter_list.push(FilterRow {
            json_title: "activePlans".to_string(),
            json_property_type: "string".to_string(),
            named_query: true,
            ..FilterRow::default()
        });
        let components = build_components(&config, &version, &version, &RouteContext::default());
        assert!(components.schemas.contains_key("x-leave-plans_id_parameter"));
        let named = &components.schemas["x-leave-plans_namedQuery_parameter"];
        assert!(named.properties.contains_key("activePlans"));
    }
}
