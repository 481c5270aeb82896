//! Path items: configuration-driven (`/api/{resource}`, `/{id}`, `/api/qapi/...`)
//! and route-driven (`/api/{template}`).

use std::collections::BTreeMap;

use colleague_metadata_core::{ApiConfiguration, ExtensibleData};

use crate::context::RouteContext;
use crate::model::{OpenApiDocument, OperationVerb, PathItem};
use crate::operations::OperationBuilder;

/// Paths of a configured resource version.
///
/// Composite-key resources never get an `/{id}` path; their single-item
/// operations move to the collection path. Alternate views are published
/// under their parent's name.
#[must_use]
pub fn configuration_paths(
    config: &ApiConfiguration,
    version: &ExtensibleData,
    context: &RouteContext,
) -> BTreeMap<String, PathItem> {
    let composite = config.is_composite_key();
    let mut collection = PathItem::default();
    let mut by_id = PathItem::default();
    let mut query = PathItem::default();

    for method in &config.http_methods {
        if method.method.is_empty() {
            continue;
        }
        let builder = OperationBuilder::new(config, version, context, method);
        if method.method.contains("QAPI") {
            if query.post.is_none() {
                query.post = Some(builder.query());
            }
            continue;
        }
        let verb = method
            .method
            .split('_')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match (verb.as_str(), method.method.to_lowercase().as_str()) {
            ("get", "get") => {
                if collection.get.is_none() {
                    collection.get = Some(builder.get());
                }
                if by_id.get.is_none() && !composite {
                    by_id.get = Some(builder.get_by_id());
                }
                if query.post.is_none() {
                    query.post = Some(builder.clone().with_response_verb("get").query());
                }
            }
            ("get", "get_id") => {
                if by_id.get.is_none() && !composite {
                    by_id.get = Some(builder.get_by_id());
                } else if collection.get.is_none() {
                    collection.get = Some(builder.get());
                }
            }
            ("get", "get_all") => {
                if collection.get.is_none() {
                    collection.get = Some(builder.get());
                }
            }
            ("put", _) => {
                let target = if composite { &mut collection } else { &mut by_id };
                target.put = Some(builder.put());
            }
            ("post", _) => collection.post = Some(builder.post()),
            ("delete", _) => {
                let target = if composite { &mut collection } else { &mut by_id };
                target.delete = Some(builder.delete());
            }
            _ => {}
        }
    }

    let name = if config.parent_resource_name.is_empty() {
        &config.resource_name
    } else {
        &config.parent_resource_name
    };
    let mut paths = BTreeMap::new();
    if !collection.is_empty() {
        paths.insert(format!("/api/{name}"), collection);
    }
    if !composite && !by_id.is_empty() {
        paths.insert(format!("/api/{name}/{{id}}"), by_id);
    }
    if !query.is_empty() {
        paths.insert(format!("/api/qapi/{name}"), query);
    }
    paths
}

/// Add the operation for `selected` to the document's path for its route.
///
/// The path key is `/api/{template}`, suffixed with ` ({parent})` for
/// alternate views. An existing path item is extended; an operation of the
/// same verb is replaced. Unknown methods leave the document untouched.
pub fn add_route_path(
    document: &mut OpenApiDocument,
    config: &ApiConfiguration,
    response: &ExtensibleData,
    request: &ExtensibleData,
    context: &RouteContext,
    selected: &str,
) {
    let Some(method) = config
        .http_methods
        .iter()
        .find(|m| m.method.eq_ignore_ascii_case(selected))
    else {
        return;
    };
    let template = method.route_template.as_str();
    let mut key = format!("/api/{template}");
    if !config.parent_resource_name.is_empty() {
        key = format!("{key} ({})", config.parent_resource_name);
    }

    let reads = OperationBuilder::new(config, response, context, method).with_route_template(template);
    let writes = OperationBuilder::new(config, request, context, method).with_route_template(template);
    let (verb, builder, mut operation, selected_for_parameters) = match selected.to_lowercase().as_str() {
        "get_id" => (OperationVerb::Get, &reads, reads.get_by_id(), selected),
        "get_all" => (OperationVerb::Get, &reads, reads.get(), selected),
        "qapi_post" => (OperationVerb::Post, &writes, writes.query(), ""),
        "put" => (OperationVerb::Put, &writes, writes.put(), ""),
        "post" => (OperationVerb::Post, &writes, writes.post(), ""),
        "delete" => (OperationVerb::Delete, &reads, reads.delete(), ""),
        _ => {
            document.paths.entry(key).or_default();
            return;
        }
    };
    builder.override_parameters(&mut operation, selected_for_parameters);
    builder.override_responses(&mut operation);
    *document.paths.entry(key).or_default().slot(verb) = Some(operation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Info;
    use colleague_metadata_core::SupportedMethod;
    use pretty_assertions::assert_eq;

    fn method(name: &str, template: &str) -> SupportedMethod {
        SupportedMethod {
            method: name.to_string(),
            route_template: template.to_string(),
            ..SupportedMethod::default()
        }
    }

    fn spec_config(methods: &[&str]) -> ApiConfiguration {
        ApiConfiguration {
            resource_name: "x-widgets".to_string(),
            api_type: "A".to_string(),
            primary_entity: "WIDGETS".to_string(),
            http_methods: methods.iter().map(|m| method(m, "")).collect(),
            ..ApiConfiguration::default()
        }
    }

    fn version() -> ExtensibleData {
        ExtensibleData::new("x-widgets", "1.0.0", "application/json", "")
    }

    #[test]
    fn get_produces_collection_item_and_query_paths() {
        let config = spec_config(&["GET", "PUT", "POST", "DELETE"]);
        let version = version();
        let paths = configuration_paths(&config, &version, &RouteContext::for_configuration());

        assert_eq!(
            paths.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["/api/qapi/x-widgets", "/api/x-widgets", "/api/x-widgets/{id}"]
        );
        let collection = &paths["/api/x-widgets"];
        assert!(collection.get.is_some() && collection.post.is_some());
        let item = &paths["/api/x-widgets/{id}"];
        assert!(item.get.is_some() && item.put.is_some() && item.delete.is_some());
        let query = paths["/api/qapi/x-widgets"].post.as_ref().expect("qapi post");
        assert!(query.responses["200"].content["application/json"]
            .schema
            .items
            .as_ref()
            .and_then(|s| s.reference.as_deref())
            .is_some_and(|r| r.ends_with("x-widgets_get_response")));
    }

    #[test]
    fn composite_keys_stay_on_the_collection_path() {
        let mut config = spec_config(&["GET_ID", "PUT", "DELETE"]);
        config.api_type = "T".to_string();
        config.colleague_key_names = vec!["A".to_string(), "B".to_string()];
        let version = version();
        let paths = configuration_paths(&config, &version, &RouteContext::for_configuration());

        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["/api/x-widgets"]);
        let collection = &paths["/api/x-widgets"];
        assert!(collection.get.is_some() && collection.put.is_some() && collection.delete.is_some());
    }

    #[test]
    fn alternate_views_use_the_parent_name() {
        let mut config = spec_config(&["QAPI_POST"]);
        config.parent_resource_name = "widgets".to_string();
        let version = version();
        let paths = configuration_paths(&config, &version, &RouteContext::for_configuration());
        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["/api/qapi/widgets"]);
    }

    #[test]
    fn route_paths_merge_into_existing_items() {
        let config = ApiConfiguration {
            resource_name: "persons".to_string(),
            api_type: "ethos".to_string(),
            http_methods: vec![method("GET_ID", "persons/{id}"), method("PUT", "persons/{id}")],
            ..ApiConfiguration::default()
        };
        let version = ExtensibleData::new("persons", "12.0.0", "application/json", "persons/{id}");
        let ctx = RouteContext::default();
        let mut document = OpenApiDocument::new(Info::default(), Vec::new());

        add_route_path(&mut document, &config, &version, &version, &ctx, "GET_ID");
        add_route_path(&mut document, &config, &version, &version, &ctx, "PUT");
        add_route_path(&mut document, &config, &version, &version, &ctx, "DELETE");

        assert_eq!(document.paths.len(), 1);
        let item = &document.paths["/api/persons/{id}"];
        assert!(item.get.is_some() && item.put.is_some());
        assert!(item.delete.is_none());
    }

    #[test]
    fn route_paths_mark_alternate_views() {
        let config = ApiConfiguration {
            resource_name: "person-names".to_string(),
            parent_resource_name: "persons".to_string(),
            api_type: "ethos".to_string(),
            http_methods: vec![method("GET_ALL", "persons")],
            ..ApiConfiguration::default()
        };
        let version = ExtensibleData::new("person-names", "1.0.0", "application/json", "persons");
        let mut document = OpenApiDocument::new(Info::default(), Vec::new());
        add_route_path(
            &mut document,
            &config,
            &version,
            &version,
            &RouteContext::default(),
            "get_all",
        );
        assert!(document.paths.contains_key("/api/persons (persons)"));
    }
}
