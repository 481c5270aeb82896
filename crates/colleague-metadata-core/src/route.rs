//! Route, controller and action descriptors.
//!
//! These replace runtime inspection of the endpoint table: every route the
//! service answers is declared once in the catalog, together with the
//! controller action that serves it and the filters attached to that action.

use serde::{Deserialize, Serialize};

use crate::types::FieldType;

/// A single endpoint in the route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteDescriptor {
    /// Route template without a leading `/` (`persons/{guid}`).
    pub template: String,
    /// HTTP verbs bound to the route (`GET`, `PUT` ...). Only the first is used.
    pub methods: Vec<String>,
    /// Controller name, with or without the `Controller` suffix.
    pub controller: String,
    /// Action name, with or without the `Async` suffix.
    pub action: String,
    /// Header-version constraint attached to the route.
    pub header_version: Option<HeaderVersion>,
    /// Content types accepted by the route body (PUT/POST).
    pub content_types: Vec<String>,
    /// Valid query string parameters for legacy (v6/v7) routes.
    pub query_filters: Option<QueryFilters>,
}

impl RouteDescriptor {
    /// Logical API name derived from the template.
    #[must_use]
    pub fn api_name(&self) -> String {
        api_name(&self.template)
    }

    /// First HTTP verb bound to the route, upper-cased.
    #[must_use]
    pub fn http_method(&self) -> Option<String> {
        self.methods.first().map(|m| m.to_uppercase())
    }

    /// Parameter names appearing in the template, in order.
    ///
    /// Constraints (`{id:guid}`) and optional markers (`{id?}`) are removed.
    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        route_parameters(&self.template)
    }

    /// Integration media types declared by the header-version constraint.
    #[must_use]
    pub fn media_types(&self) -> &[String] {
        self.header_version
            .as_ref()
            .map_or(&[], |hv| hv.media_types.as_slice())
    }

    /// Whether the route serves an Ethos (EEDM) or Ethos-enabled endpoint.
    #[must_use]
    pub fn is_ethos(&self) -> bool {
        self.header_version
            .as_ref()
            .is_some_and(|hv| hv.eedm || hv.ethos_enabled)
    }
}

/// Media-type constraint carried by versioned routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderVersion {
    /// Accepted media types; the first one drives document generation.
    pub media_types: Vec<String>,
    /// Version the route answers to (`12.1.0`, `6`).
    pub route_version: String,
    /// Ethos data model endpoint.
    pub eedm: bool,
    /// Hand-coded endpoint answering Ethos media types.
    pub ethos_enabled: bool,
    /// Route answers requests that carry no version.
    pub satisfy_versionless: bool,
    /// Administrative route (multi-segment GET kept in discovery).
    pub administrative: bool,
    /// Route accepts bulk requests.
    pub bulk_supported: bool,
}

/// Valid query parameters and named queries of a legacy route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFilters {
    /// Query string parameters accepted by the route.
    pub params: Vec<String>,
    /// Named queries accepted by the route.
    pub named_queries: Vec<String>,
}

/// A controller and the actions it exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerDescriptor {
    /// Controller name (`Persons` or `PersonsController`).
    pub name: String,
    /// License module code, used to derive a domain when none is documented.
    pub module: String,
    /// Controller-level documentation.
    pub docs: Option<ControllerDocs>,
    /// Public actions.
    pub actions: Vec<ActionDescriptor>,
}

impl ControllerDescriptor {
    /// Whether this controller is the one a route names.
    #[must_use]
    pub fn matches(&self, controller: &str) -> bool {
        let own = self.name.strip_suffix("Controller").unwrap_or(&self.name);
        let wanted = controller.strip_suffix("Controller").unwrap_or(controller);
        own == wanted
    }

    /// Find an action by exact name, falling back to `{name}Async`.
    #[must_use]
    pub fn find_action(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|a| a.name == name).or_else(|| {
            if name.ends_with("Async") {
                return None;
            }
            let with_suffix = format!("{name}Async");
            self.actions.iter().find(|a| a.name == with_suffix)
        })
    }

    /// Find the best action whose name starts with `name`.
    ///
    /// An exact match wins over `{name}Async`, which wins over any other
    /// name sharing the prefix.
    #[must_use]
    pub fn find_action_by_prefix(&self, name: &str) -> Option<&ActionDescriptor> {
        let async_len = name.len() + "Async".len();
        self.actions
            .iter()
            .filter(|a| a.name.starts_with(name))
            .min_by_key(|a| match a.name.len() {
                n if n == name.len() => 0,
                n if n == async_len => 1,
                _ => 2,
            })
    }
}

/// Controller-level documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerDocs {
    /// API description used when the action carries none.
    pub description: String,
    /// Domain code (`ST`, `CF` ...).
    pub api_domain: String,
}

/// A controller action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionDescriptor {
    /// Action name.
    pub name: String,
    /// Filters attached to the action.
    pub filters: Vec<ActionFilter>,
    /// Action documentation.
    pub docs: Option<ActionDocs>,
    /// Declared return type (`Person[]`, `action_result` ...).
    pub returns: Option<FieldType>,
    /// Declared body type for PUT/POST/QAPI actions.
    pub request_body: Option<FieldType>,
    /// Set when the action is obsolete. An empty message uses the default text.
    pub obsolete: Option<String>,
}

impl ActionDescriptor {
    /// Page limit declared by a paging filter, when non-zero.
    #[must_use]
    pub fn paging_limit(&self) -> Option<u32> {
        self.filters.iter().find_map(|f| match f {
            ActionFilter::Paging { default_limit } if *default_limit > 0 => Some(*default_limit),
            _ => None,
        })
    }

    /// Query-string filter groups in declaration order.
    pub fn query_string_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.iter().filter_map(|f| match f {
            ActionFilter::QueryString { group, type_name } => {
                Some((group.as_str(), type_name.as_str()))
            }
            _ => None,
        })
    }

    /// Content types accepted by a content-type constraint.
    #[must_use]
    pub fn content_types(&self) -> Vec<String> {
        self.filters
            .iter()
            .filter_map(|f| match f {
                ActionFilter::ContentType { types } => Some(types.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Error content type declared by a custom media type filter.
    #[must_use]
    pub fn error_content_type(&self) -> Option<&str> {
        self.filters.iter().find_map(|f| match f {
            ActionFilter::CustomMediaType { error_content_type } => {
                Some(error_content_type.as_str())
            }
            _ => None,
        })
    }

    /// Whether leaf names of projected types are camel-cased.
    #[must_use]
    pub fn uses_camel_case(&self) -> bool {
        self.filters
            .iter()
            .rev()
            .find_map(|f| match f {
                ActionFilter::EthosEnabled { camel_case } => Some(*camel_case),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Whether the action is a collection endpoint by virtue of its filters.
    #[must_use]
    pub fn forces_get_all(&self) -> bool {
        self.filters.iter().any(|f| {
            matches!(
                f,
                ActionFilter::Paging { .. }
                    | ActionFilter::Filtering { .. }
                    | ActionFilter::QueryString { .. }
            )
        })
    }
}

/// Filters attached to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionFilter {
    /// Collection paging.
    Paging {
        /// Default page size; zero means unspecified.
        #[serde(default)]
        default_limit: u32,
    },
    /// Default filtering behavior.
    Filtering {
        /// Ignore default filtering.
        #[serde(default)]
        ignore: bool,
    },
    /// Permission codes required by the action.
    Permissions {
        /// Permission codes.
        #[serde(default)]
        codes: Vec<String>,
    },
    /// Query-string filter group bound to a DTO type.
    QueryString {
        /// Group name (`criteria` or a named query).
        group: String,
        /// DTO type describing the filter.
        type_name: String,
    },
    /// Accepted request content types.
    ContentType {
        /// Content types.
        #[serde(default)]
        types: Vec<String>,
    },
    /// Custom media type handling, including the error format.
    CustomMediaType {
        /// Error content type (`application/vnd.hedtech.integration.errors.v2+json`).
        #[serde(default)]
        error_content_type: String,
    },
    /// Ethos-enabled response shaping.
    EthosEnabled {
        /// Camel-case property names.
        #[serde(default)]
        camel_case: bool,
    },
}

/// Documentation attached to an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionDocs {
    /// Domain code overriding the controller's.
    pub api_domain: String,
    /// API type overriding the route-derived one (`bpa`, `ethos` ...).
    pub api_type: String,
    /// Intended audience, written to `x-audience`.
    pub audience: String,
    /// Deprecation date.
    pub deprecated_on: String,
    /// Sunset date.
    pub sunset_on: String,
    /// Version-level description used for `info.description`.
    pub version_description: String,
    /// Version release status (`B`, `R` ...).
    pub version_status: String,
    /// Permission required by the method.
    pub permission: String,
    /// Operation summary.
    pub summary: String,
    /// Description of what the method returns.
    pub returns: String,
    /// Operation description.
    pub description: String,
    /// License name appended to the description and used for `info.license`.
    pub license: String,
    /// Note appended to the description.
    pub note: String,
    /// Documented arguments, in declaration order.
    pub arguments: Vec<ArgumentDoc>,
    /// Documented failures. Each line names a status code or its name.
    pub exceptions: Vec<String>,
}

/// A documented action argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDoc {
    /// Argument name.
    pub name: String,
    /// Argument description.
    #[serde(default)]
    pub description: String,
}

/// HTTP method kinds recognized when building operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodKind {
    /// Collection and single-item GET.
    Get,
    /// Single item GET.
    GetId,
    /// Collection GET.
    GetAll,
    /// Update.
    Put,
    /// Create.
    Post,
    /// Delete.
    Delete,
    /// Query by POST.
    Qapi,
}

impl MethodKind {
    /// Parse a method string. Any value mentioning `qapi` is a query-by-POST.
    #[must_use]
    pub fn parse(method: &str) -> Option<Self> {
        let lower = method.to_lowercase();
        if lower.contains("qapi") {
            return Some(Self::Qapi);
        }
        match lower.as_str() {
            "get" => Some(Self::Get),
            "get_id" => Some(Self::GetId),
            "get_all" => Some(Self::GetAll),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Canonical upper-case name (`GET_ALL`, `QAPI_POST` ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::GetId => "GET_ID",
            Self::GetAll => "GET_ALL",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Qapi => "QAPI_POST",
        }
    }

    /// Verb segment used in component schema names.
    #[must_use]
    pub const fn schema_verb(self) -> &'static str {
        match self {
            Self::Get | Self::GetId | Self::GetAll => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Qapi => "query",
        }
    }

    /// Whether the method reads a request body.
    #[must_use]
    pub const fn has_request_body(self) -> bool {
        matches!(self, Self::Put | Self::Post | Self::Qapi)
    }
}

impl std::fmt::Display for MethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the logical API name from a route template.
///
/// Multi-part templates join every literal segment with `-`, skipping
/// parameters and the `qapi` prefix: `qapi/persons` and `persons/{id}` both
/// yield `persons`.
#[must_use]
pub fn api_name(template: &str) -> String {
    let segments: Vec<&str> = template.split('/').collect();
    if segments.len() < 2 {
        return template.to_string();
    }
    segments
        .iter()
        .filter(|s| !s.contains('{') && **s != "qapi")
        .fold(String::new(), |acc, s| format!("{acc}-{s}"))
        .trim_start_matches('-')
        .to_string()
}

/// Parameter names in a route template.
#[must_use]
pub fn route_parameters(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let raw = &after[..end];
        let name = raw
            .split(':')
            .next()
            .unwrap_or_default()
            .trim_start_matches('*')
            .trim_end_matches('?');
        if !name.is_empty() {
            names.push(name.to_string());
        }
        rest = &after[end + 1..];
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_name_from_templates() {
        assert_eq!(api_name("persons"), "persons");
        assert_eq!(api_name("persons/{guid}"), "persons");
        assert_eq!(api_name("qapi/persons"), "persons");
        assert_eq!(api_name("persons/{id}/photo"), "persons-photo");
        assert_eq!(api_name("/persons"), "persons");
    }

    #[test]
    fn route_parameters_strip_constraints() {
        assert_eq!(
            route_parameters("students/{id:guid}/terms/{term?}"),
            vec!["id".to_string(), "term".to_string()]
        );
        assert!(route_parameters("persons").is_empty());
    }

    #[test]
    fn method_kind_parse_is_case_insensitive() {
        assert_eq!(MethodKind::parse("GET_ALL"), Some(MethodKind::GetAll));
        assert_eq!(MethodKind::parse("get_id"), Some(MethodKind::GetId));
        assert_eq!(MethodKind::parse("QAPI_POST"), Some(MethodKind::Qapi));
        assert_eq!(MethodKind::parse("post_qapi"), Some(MethodKind::Qapi));
        assert_eq!(MethodKind::parse("patch"), None);
        assert_eq!(MethodKind::Qapi.schema_verb(), "query");
    }

    #[test]
    fn find_action_falls_back_to_async() {
        let controller = ControllerDescriptor {
            name: "PersonsController".into(),
            actions: vec![
                ActionDescriptor {
                    name: "GetPersonAsync".into(),
                    ..Default::default()
                },
                ActionDescriptor {
                    name: "GetPersonsByFilter".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert!(controller.matches("Persons"));
        assert_eq!(
            controller.find_action("GetPerson").map(|a| a.name.as_str()),
            Some("GetPersonAsync")
        );
        assert!(controller.find_action("Missing").is_none());
        assert_eq!(
            controller
                .find_action_by_prefix("GetPerson")
                .map(|a| a.name.as_str()),
            Some("GetPersonAsync")
        );
    }

    #[test]
    fn action_filter_accessors() {
        let action = ActionDescriptor {
            name: "GetPersons".into(),
            filters: vec![
                ActionFilter::Paging { default_limit: 50 },
                ActionFilter::QueryString {
                    group: "criteria".into(),
                    type_name: "PersonFilter".into(),
                },
                ActionFilter::EthosEnabled { camel_case: true },
            ],
            ..Default::default()
        };
        assert_eq!(action.paging_limit(), Some(50));
        assert!(action.forces_get_all());
        assert!(action.uses_camel_case());
        assert_eq!(
            action.query_string_filters().collect::<Vec<_>>(),
            vec![("criteria", "PersonFilter")]
        );
    }

    #[test]
    fn filters_deserialize_from_tagged_yaml() {
        let yaml = "- kind: paging\n  default_limit: 25\n- kind: custom_media_type\n  error_content_type: v2\n";
        let filters: Vec<ActionFilter> = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(filters[0], ActionFilter::Paging { default_limit: 25 });
        assert_eq!(
            filters[1],
            ActionFilter::CustomMediaType {
                error_content_type: "v2".into()
            }
        );
    }
}
