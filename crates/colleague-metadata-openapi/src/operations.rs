//! Operation builders: one per method kind, plus the overrides applied to
//! route-driven operations from their action docs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use colleague_metadata_core::{ApiConfiguration, ExtensibleData, SupportedMethod, SUB_VALUE_MARK};
use regex::{Captures, Regex};
use serde_json::Value;

use crate::context::{component_name, schema_prefix, RouteContext};
use crate::model::{
    Header, MediaType, Operation, Parameter, ParameterLocation, RequestBody, Response, Schema,
    SecurityRequirement,
};
use crate::schema::GUID_PATTERN;

/// Bearer token security scheme name.
pub const BEARER_SCHEME: &str = "EthosIntegrationBearer";

/// Basic authentication security scheme name.
pub const BASIC_SCHEME: &str = "BasicAuth";

/// Media type of v2 error bodies.
pub const V2_ERROR_MEDIA_TYPE: &str = "application/vnd.hedtech.integration.errors.v2+json";

const LIMIT_TEXT: &str = "The maximum number of resources requested for this result set.";
const OFFSET_TEXT: &str = "The 0 based index for a collection of resources for the page requested.";
const CRITERIA_TEXT: &str = "The filter criteria as a single URL query parameter. Use this parameter or the individual parameters listed. This must be a JSON representation that can be validated against the schema. Limit and Offset are the only supported additional parameters on the URL.";
const GUID_ID_TEXT: &str = "A global identifier of the resource for use in all external references.";
const COMPOSITE_ID_TEXT: &str = "Must be a JSON representation of the properties that make up the id block of a single record. No additional parameters on the URL are allowed.";
const NAMED_QUERY_TEXT: &str = "A named query is specified as a query parameter and may require arguments which must be expressed using JSON (where the arguments are provided as name-value pairs akin to the ad-hoc query syntax used for filtering by 'equality', as described above).";

const UNAUTHORIZED_TEXT: &str =
    "Failure. Unauthorized indicates that the requested resource requires authentication.";
const NOT_FOUND_TEXT: &str =
    "Failure. NotFound indicates that the requested resource does not exist on the server.";
const METHOD_NOT_ALLOWED_TEXT: &str = "Failure. MethodNotAllowed indicates that the client tried to use an HTTP method that the resource does not allow.";
const NOT_ACCEPTABLE_TEXT: &str = "Failure. NotAcceptable indicates that the request was not able to generate any of the client’s preferred media types, as indicated by the Accept request header.";
const BAD_REQUEST_TEXT: &str = "Failure. BadRequest indicates that the server cannot or will not process the request due to something that is perceived to be a client error.";
const SERVER_ERROR_TEXT: &str = "Server error, unexpected configuration or data";

/// Failure codes every operation documents, in emission order.
const FAILURE_CODES: [&str; 7] = ["401", "403", "404", "405", "406", "400", "500"];

/// The security requirement attached to every operation: both schemes in a
/// single requirement object.
#[must_use]
pub fn security_requirement() -> SecurityRequirement {
    BTreeMap::from([
        (BEARER_SCHEME.to_string(), Vec::new()),
        (BASIC_SCHEME.to_string(), Vec::new()),
    ])
}

/// Which operation is being built. Drives the default summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Get,
    GetById,
    Put,
    Post,
    Delete,
    Query,
}

impl Kind {
    /// Leading phrase of the generated summaries.
    const fn lead(self) -> &'static str {
        match self {
            Self::Get => "Returns resources from",
            Self::GetById => "Returns the requested resource from",
            Self::Put => "Updates requested resource from",
            Self::Post => "Creates a new resource in",
            Self::Delete => "Deletes requested resource from",
            Self::Query => "Returns requested resource from",
        }
    }

    /// Summary used when the method carries none. `None` leaves the summary
    /// empty, even if the method has one.
    fn default_summary(self, config: &ApiConfiguration) -> Option<String> {
        let lead = self.lead();
        if config.is_spec() {
            let with_table = matches!(self, Self::Get | Self::GetById | Self::Put | Self::Query)
                && !config.primary_table_name.is_empty();
            return Some(if with_table {
                format!(
                    "{lead} {} from {}-{}.",
                    config.primary_table_name, config.primary_application, config.primary_entity
                )
            } else if self == Self::Put {
                format!("{lead} from {}.", config.primary_entity)
            } else {
                format!("{lead} {}.", config.primary_entity)
            });
        }
        if config.is_bpa() {
            return Some(format!("{lead} {} - {}.", config.process_id, config.process_desc));
        }
        let name = &config.resource_name;
        match self {
            Self::Get if config.is_ethos() || config.is_web() => {
                Some(format!("Returns {name} resources."))
            }
            // collection reads of any other type only show an explicit summary
            Self::Get => Some(String::new()),
            Self::Post if config.is_ethos() || config.is_legacy() => {
                Some(format!("Creates requested resource in {name}."))
            }
            Self::Delete => Some(format!("{lead} {name}.")),
            Self::GetById | Self::Put | Self::Query if config.is_ethos() || config.is_legacy() => {
                Some(format!("{lead} {name}."))
            }
            _ => None,
        }
    }
}

/// Builds the operations of one resource version.
#[derive(Debug, Clone)]
pub struct OperationBuilder<'a> {
    config: &'a ApiConfiguration,
    version: &'a ExtensibleData,
    context: &'a RouteContext,
    method: &'a SupportedMethod,
    route_template: &'a str,
    response_verb: String,
}

impl<'a> OperationBuilder<'a> {
    /// Builder for `method` of `config` at `version`.
    ///
    /// The response component verb defaults to the method's leading
    /// segment (`get`, `put` ...) with `qapi` mapped to `query`.
    #[must_use]
    pub fn new(
        config: &'a ApiConfiguration,
        version: &'a ExtensibleData,
        context: &'a RouteContext,
        method: &'a SupportedMethod,
    ) -> Self {
        Self {
            config,
            version,
            context,
            method,
            route_template: "",
            response_verb: response_verb(&method.method),
        }
    }

    /// Build against a concrete route template.
    #[must_use]
    pub fn with_route_template(mut self, template: &'a str) -> Self {
        self.route_template = template;
        self
    }

    /// Reference a different `{verb}_response` component from the 200 response.
    #[must_use]
    pub fn with_response_verb(mut self, verb: impl Into<String>) -> Self {
        self.response_verb = verb.into();
        self
    }

    fn prefix(&self) -> String {
        schema_prefix(self.config, self.route_template)
    }

    fn base(&self, kind: Kind) -> Operation {
        let mut operation = Operation {
            tags: vec![self.config.resource_name.clone()],
            summary: self.summary(kind),
            security: vec![security_requirement()],
            ..Operation::default()
        };
        if !self.method.description.is_empty() {
            operation.description = unescape(&self.method.description.replace(SUB_VALUE_MARK, " "));
        }
        if !self.method.permission.is_empty() {
            operation.extensions.insert(
                "x-method-permission".to_string(),
                Value::String(self.method.permission.clone()),
            );
        }
        operation.extensions.insert(
            "x-audience".to_string(),
            Value::String(self.config.audience.clone()),
        );
        for (key, raw) in [
            ("x-deprecated-on", &self.config.deprecated_on),
            ("x-sunset-on", &self.config.sunset_on),
        ] {
            if raw.trim().is_empty() {
                continue;
            }
            match parse_date(raw) {
                Some(date) => {
                    operation
                        .extensions
                        .insert(key.to_string(), Value::String(date.to_rfc3339()));
                }
                None => tracing::warn!(
                    resource = %self.config.resource_name,
                    value = %raw,
                    "unparseable {key} date; extension omitted"
                ),
            }
        }
        operation
    }

    fn summary(&self, kind: Kind) -> String {
        let Some(default) = kind.default_summary(self.config) else {
            return String::new();
        };
        if self.method.summary.is_empty() {
            default
        } else {
            self.method.summary.replace(SUB_VALUE_MARK, " ")
        }
    }

    fn is_guid(&self) -> bool {
        !self.config.primary_guid_source.is_empty()
    }

    fn limit_text(&self, trailing_period: bool) -> String {
        match self.config.page_limit {
            Some(limit) if trailing_period => {
                format!("{LIMIT_TEXT} The maximum valid limit value is {limit}.")
            }
            Some(limit) => format!("{LIMIT_TEXT} The maximum valid limit value is {limit}"),
            None => LIMIT_TEXT.to_string(),
        }
    }

    /// Collection GET.
    #[must_use]
    pub fn get(&self) -> Operation {
        let mut operation = self.base(Kind::Get);
        let prefix = self.prefix();
        let mut paged = false;
        if !self.config.get_by_id_only() && !self.config.is_legacy() {
            operation.parameters.push(plain_parameter(
                "limit",
                ParameterLocation::Query,
                false,
                self.limit_text(true),
                "integer",
            ));
            operation.parameters.push(plain_parameter(
                "offset",
                ParameterLocation::Query,
                false,
                OFFSET_TEXT,
                "integer",
            ));
            if (self.config.is_ethos() || self.config.is_web()) && self.context.has_query_name("criteria") {
                operation
                    .parameters
                    .push(reference_parameter("criteria", false, CRITERIA_TEXT, &prefix));
            }
            paged = true;
        }
        if self.config.is_composite_key() && !self.config.get_all_only() {
            operation.parameters.push(reference_parameter(
                "id",
                self.config.get_by_id_only(),
                format!("{COMPOSITE_ID_TEXT} "),
                &prefix,
            ));
        }
        if self
            .version
            .extended_data_filter_list
            .iter()
            .any(|filter| filter.named_query)
        {
            let mut parameter = reference_parameter("namedQuery", false, NAMED_QUERY_TEXT, &prefix);
            parameter.schema.schema_type = Some("object".to_string());
            operation.parameters.push(parameter);
        }
        operation.responses = self.responses("200", paged);
        operation
    }

    /// Single-item GET.
    #[must_use]
    pub fn get_by_id(&self) -> Operation {
        let mut operation = self.base(Kind::GetById);
        let prefix = self.prefix();
        operation.parameters.push(self.id_parameter(&prefix));
        operation.responses = self.responses("200", false);
        operation
    }

    /// PUT.
    #[must_use]
    pub fn put(&self) -> Operation {
        let mut operation = self.base(Kind::Put);
        let prefix = self.prefix();
        if self.config.is_composite_key() {
            operation.parameters.push(reference_parameter(
                "id",
                true,
                composite_id_text_spaced(),
                &prefix,
            ));
        }
        if self.route_template.contains("{id}") {
            operation
                .parameters
                .push(id_path_parameter(self.is_guid()));
        }
        operation.request_body = Some(self.request_body("put", &prefix));
        operation.responses = self.responses("200", false);
        operation
    }

    /// POST.
    #[must_use]
    pub fn post(&self) -> Operation {
        let mut operation = self.base(Kind::Post);
        let prefix = self.prefix();
        operation.request_body = Some(self.request_body("post", &prefix));
        operation.responses = self.responses("200", false);
        operation
    }

    /// DELETE.
    #[must_use]
    pub fn delete(&self) -> Operation {
        let mut operation = self.base(Kind::Delete);
        let prefix = self.prefix();
        if self.config.is_composite_key() {
            operation
                .parameters
                .push(reference_parameter("id", true, COMPOSITE_ID_TEXT, &prefix));
        } else {
            operation.parameters.push(id_path_parameter(self.is_guid()));
        }
        operation.responses = self.responses("204", false);
        operation
    }

    /// Query by POST (`/api/qapi/...`).
    #[must_use]
    pub fn query(&self) -> Operation {
        let mut operation = self.base(Kind::Query);
        let prefix = self.prefix();
        if !self.config.is_legacy() {
            operation.parameters.push(plain_parameter(
                "limit",
                ParameterLocation::Query,
                false,
                self.limit_text(false),
                "integer",
            ));
            operation.parameters.push(plain_parameter(
                "offset",
                ParameterLocation::Query,
                false,
                OFFSET_TEXT,
                "integer",
            ));
        }
        operation.request_body = Some(self.request_body("query", &prefix));
        operation.responses = self.responses("200", true);
        operation
    }

    fn id_parameter(&self, prefix: &str) -> Parameter {
        if self.config.is_composite_key() {
            reference_parameter("id", true, composite_id_text_spaced(), prefix)
        } else {
            id_path_parameter(self.is_guid())
        }
    }

    /// Replace generated parameters with the method's documented arguments.
    ///
    /// Arguments named in the route template become required path
    /// parameters. Others become query parameters for reads (`selected`
    /// starting with `get`) and for methods selected without a name; `page`
    /// expands to `limit` and `offset`. Other methods drop them.
    pub fn override_parameters(&self, operation: &mut Operation, selected: &str) {
        if self.method.arguments.is_empty() {
            return;
        }
        let template = self.route_template;
        let prefix = self.prefix();
        let is_read = selected.to_lowercase().starts_with("get");
        let mut parameters = Vec::new();
        for (key, value) in &self.method.arguments {
            if template.contains(&format!("{{{key}}}")) {
                parameters.push(plain_parameter(
                    key,
                    ParameterLocation::Path,
                    true,
                    value.clone(),
                    "string",
                ));
            } else if is_read && key == "page" {
                parameters.push(plain_parameter(
                    "limit",
                    ParameterLocation::Query,
                    false,
                    format!("{LIMIT_TEXT}\n\n<b>/api/{template}?limit={{limit}}</b>"),
                    "integer",
                ));
                parameters.push(plain_parameter(
                    "offset",
                    ParameterLocation::Query,
                    false,
                    format!("{OFFSET_TEXT}\n\n<b>/api/{template}?offset={{offset}}</b>"),
                    "integer",
                ));
            } else if is_read && key == "criteria" {
                parameters.push(reference_parameter(
                    "criteria",
                    false,
                    format!("{CRITERIA_TEXT}\n\n<b>/api/{template}?criteria={{criteria}}</b>"),
                    &prefix,
                ));
            } else if is_read || selected.is_empty() {
                let description = format!("{value}\n\n<b>/api/{template}?{key}={{{key}}}</b>");
                if self.context.has_query_name(key) {
                    parameters.push(reference_parameter(key, false, description, &prefix));
                } else {
                    parameters.push(plain_parameter(
                        key,
                        ParameterLocation::Query,
                        false,
                        description,
                        "string",
                    ));
                }
            }
        }
        operation.parameters = parameters;
    }

    /// Rebuild failure responses from the method's documented exceptions.
    ///
    /// Success responses are kept. Each exception line maps to the first
    /// status it names; the first line claiming a status wins. Statuses not
    /// documented get their defaults (405 and 406 only with v2 errors).
    pub fn override_responses(&self, operation: &mut Operation) {
        let mut responses = BTreeMap::new();
        for code in ["200", "204"] {
            if let Some(kept) = operation.responses.remove(code) {
                responses.insert(code.to_string(), kept);
            }
        }
        for exception in &self.method.exceptions {
            let Some(code) = exception_status(exception) else {
                continue;
            };
            responses.entry(code.to_string()).or_insert_with(|| Response {
                content: self.error_content(),
                ..Response::described(format!("Failure. {exception}"))
            });
        }
        let mut defaults = vec![
            ("401", UNAUTHORIZED_TEXT, false),
            (
                "403",
                "Failure. Forbidden indicates that the user does not have the necessary permissions for the resource.",
                true,
            ),
            ("404", NOT_FOUND_TEXT, false),
        ];
        if self.context.use_v2_errors {
            defaults.push(("405", METHOD_NOT_ALLOWED_TEXT, true));
            defaults.push(("406", NOT_ACCEPTABLE_TEXT, true));
        }
        defaults.push(("400", BAD_REQUEST_TEXT, true));
        defaults.push(("500", SERVER_ERROR_TEXT, true));
        for (code, text, with_content) in defaults {
            responses.entry(code.to_string()).or_insert_with(|| {
                let mut response = Response::described(text);
                if with_content {
                    response.content = self.error_content();
                }
                response
            });
        }
        operation.responses = responses;
    }

    fn responses(&self, success: &str, paged: bool) -> BTreeMap<String, Response> {
        std::iter::once(success)
            .chain(FAILURE_CODES)
            .map(|code| (code.to_string(), self.response(code, paged)))
            .collect()
    }

    /// A generated response for `code`.
    fn response(&self, code: &str, paged: bool) -> Response {
        match code {
            "200" => self.ok_response(paged),
            "204" => Response::described("OK, No Content."),
            "401" => Response::described(UNAUTHORIZED_TEXT),
            "404" => Response::described(NOT_FOUND_TEXT),
            "500" => Response::described(SERVER_ERROR_TEXT),
            _ => {
                let text = match code {
                    "403" => "Failure. Forbidden indicates that the user does not have the required permissions for the resource.",
                    "405" => METHOD_NOT_ALLOWED_TEXT,
                    "406" => NOT_ACCEPTABLE_TEXT,
                    _ => BAD_REQUEST_TEXT,
                };
                Response {
                    content: self.error_content(),
                    ..Response::described(text)
                }
            }
        }
    }

    fn ok_response(&self, paged: bool) -> Response {
        let legacy = self.config.is_legacy();
        let mut response = Response::described("OK");
        response.headers.insert(
            "X-Media-Type".to_string(),
            Header {
                description: if legacy {
                    "The media type with the version number of the response."
                } else {
                    "The full semantic version with the media type of the response."
                }
                .to_string(),
                required: true,
                schema: Schema::typed("string"),
            },
        );
        response.headers.insert(
            "X-Content-Restricted".to_string(),
            header(
                "If the resource is not a full representation of the resource, partial is returned. Otherwise, this header is not included.",
                "string",
            ),
        );
        if paged && !legacy {
            response.headers.insert(
                "X-Total-Count".to_string(),
                header("Specifies the total number of resources that satisfy the query.", "integer"),
            );
            response.headers.insert(
                "X-Max-Page-Size".to_string(),
                header("Specifies the maximum number of resources returned in a response.", "integer"),
            );
        }
        let schema = Schema::array_of(Schema::reference(&component_name(
            &self.prefix(),
            &self.response_verb,
            "response",
        )));
        let schema_type = &self.version.extended_schema_type;
        let media_type = if schema_type.starts_with("application") {
            schema_type.clone()
        } else {
            format!("application/{schema_type}")
        };
        response.content.insert(media_type, MediaType { schema });
        response
    }

    fn error_content(&self) -> BTreeMap<String, MediaType> {
        let (media_type, schema) = if self.context.use_v2_errors {
            (
                V2_ERROR_MEDIA_TYPE,
                Schema::array_of(Schema::reference("errors_2_0_0")),
            )
        } else {
            ("application/json", Schema::reference("errors"))
        };
        BTreeMap::from([(media_type.to_string(), MediaType { schema })])
    }

    fn request_body(&self, verb: &str, prefix: &str) -> RequestBody {
        let schema = Schema::array_of(Schema::reference(&component_name(prefix, verb, "request")));
        let media_types = if self.context.requested_content_types.is_empty() {
            let schema_type = &self.version.extended_schema_type;
            if schema_type.starts_with("application") || schema_type.contains('/') {
                vec![schema_type.clone()]
            } else {
                vec![format!("application/{schema_type}")]
            }
        } else {
            self.context.requested_content_types.clone()
        };
        RequestBody {
            content: media_types
                .into_iter()
                .map(|media_type| (media_type, MediaType { schema: schema.clone() }))
                .collect(),
        }
    }
}

/// Response component verb for a method string: its leading segment,
/// lower-cased, with `qapi` (or nothing) meaning `query`.
#[must_use]
pub fn response_verb(method: &str) -> String {
    let verb = method.split('_').next().unwrap_or_default().to_lowercase();
    if verb.is_empty() || verb == "qapi" || method.to_lowercase().contains("qapi") {
        "query".to_string()
    } else {
        verb
    }
}

/// Status code named by a documented exception line.
fn exception_status(exception: &str) -> Option<&'static str> {
    let lower = exception.to_lowercase();
    [
        ("400", "badrequest"),
        ("401", "unauthorized"),
        ("403", "forbidden"),
        ("404", "notfound"),
        ("405", "methodnotallowed"),
        ("500", "notacceptable"),
    ]
    .into_iter()
    .find(|(code, word)| exception.contains(code) || lower.contains(word))
    .map(|(code, _)| code)
}

fn composite_id_text_spaced() -> String {
    format!(
        "{} ",
        COMPOSITE_ID_TEXT.replacen("of the properties", "of the  properties", 1)
    )
}

fn header(description: &str, schema_type: &str) -> Header {
    Header {
        description: description.to_string(),
        required: false,
        schema: Schema::typed(schema_type),
    }
}

fn plain_parameter(
    name: &str,
    location: ParameterLocation,
    required: bool,
    description: impl Into<String>,
    schema_type: &str,
) -> Parameter {
    Parameter {
        name: name.to_string(),
        location,
        description: description.into(),
        required,
        schema: Schema::typed(schema_type),
    }
}

fn id_path_parameter(guid: bool) -> Parameter {
    let mut parameter = plain_parameter("id", ParameterLocation::Path, true, GUID_ID_TEXT, "string");
    if guid {
        parameter.schema.format = Some("guid".to_string());
        parameter.schema.pattern = Some(GUID_PATTERN.to_string());
    }
    parameter
}

/// Query parameter whose schema is a component: `{prefix}{name}_parameter`,
/// or the query request schema for `criteria`.
fn reference_parameter(
    name: &str,
    required: bool,
    description: impl Into<String>,
    prefix: &str,
) -> Parameter {
    let target = if name == "criteria" {
        component_name(prefix, "query", "request")
    } else {
        component_name(prefix, name, "parameter")
    };
    Parameter {
        name: name.to_string(),
        location: ParameterLocation::Query,
        description: description.into(),
        required,
        schema: Schema::reference(&target),
    }
}

/// Parse a configured deprecation or sunset date.
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date);
    }
    let utc = FixedOffset::east_opt(0)?;
    if let Ok(date) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return date.and_local_timezone(utc).single();
    }
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|date| date.and_local_timezone(utc).single())
}

static ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(u[0-9a-fA-F]{4}|x[0-9a-fA-F]{2}|.)").expect("ESCAPE: invalid regex pattern")
});

/// Resolve backslash escapes (`\n`, `\t`, `é` ...) in documentation text.
pub(crate) fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    ESCAPE
        .replace_all(text, |caps: &Captures<'_>| {
            let escape = &caps[1];
            match escape {
                "n" => "\n".to_string(),
                "t" => "\t".to_string(),
                "r" => "\r".to_string(),
                "a" => "\u{7}".to_string(),
                "b" => "\u{8}".to_string(),
                "f" => "\u{c}".to_string(),
                "v" => "\u{b}".to_string(),
                "e" => "\u{1b}".to_string(),
                _ if escape.len() > 1 => u32::from_str_radix(&escape[1..], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map_or_else(|| caps[0].to_string(), String::from),
                other => other.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use colleague_metadata_core::FilterRow;
    use pretty_assertions::assert_eq;

    fn ethos_config() -> ApiConfiguration {
        ApiConfiguration {
            resource_name: "persons".to_string(),
            api_type: "ethos".to_string(),
            audience: "public".to_string(),
            primary_guid_source: "PERSON".to_string(),
            page_limit: Some(500),
            http_methods: vec![
                SupportedMethod {
                    method: "GET_ALL".to_string(),
                    ..SupportedMethod::default()
                },
                SupportedMethod {
                    method: "GET_ID".to_string(),
                    ..SupportedMethod::default()
                },
            ],
            ..ApiConfiguration::default()
        }
    }

    fn version() -> ExtensibleData {
        ExtensibleData::new("persons", "12.1.0", "vnd.hedtech.integration.v12.1.0+json", "persons")
    }

    fn method(name: &str) -> SupportedMethod {
        SupportedMethod {
            method: name.to_string(),
            ..SupportedMethod::default()
        }
    }

    #[test]
    fn get_has_paging_parameters_and_headers() {
        let config = ethos_config();
        let version = version();
        let ctx = RouteContext::default();
        let method = method("GET_ALL");
        let op = OperationBuilder::new(&config, &version, &ctx, &method).get();

        assert_eq!(op.tags, vec!["persons".to_string()]);
        assert_eq!(op.summary, "Returns persons resources.");
        let names: Vec<_> = op.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["limit", "offset"]);
        assert_eq!(
            op.parameters[0].description,
            "The maximum number of resources requested for this result set. The maximum valid limit value is 500."
        );
        let ok = &op.responses["200"];
        assert!(ok.headers.contains_key("X-Total-Count"));
        assert!(ok.headers.contains_key("X-Max-Page-Size"));
        let content = &ok.content["application/vnd.hedtech.integration.v12.1.0+json"];
        assert_eq!(
            content.schema.items.as_ref().and_then(|s| s.reference.as_deref()),
            Some("#/components/schemas/persons_get_response")
        );
        assert_eq!(op.extensions["x-audience"], Value::String("public".into()));
        assert_eq!(op.security, vec![security_requirement()]);
    }

    #[test]
    fn get_adds_criteria_and_named_query_references() {
        let config = ethos_config();
        let mut version = version();
        version.extended_data_filter_list.push(FilterRow {
            json_title: "personFilter".to_string(),
            named_query: true,
            ..FilterRow::default()
        });
        let mut ctx = RouteContext::default();
        ctx.query_names.insert("criteria".to_string(), version.clone());
        let method = method("GET_ALL");
        let op = OperationBuilder::new(&config, &version, &ctx, &method).get();

        let criteria = op.parameters.iter().find(|p| p.name == "criteria");
        assert_eq!(
            criteria.and_then(|p| p.schema.reference.as_deref()),
            Some("#/components/schemas/persons_query_request")
        );
        let named = op.parameters.iter().find(|p| p.name == "namedQuery");
        assert_eq!(
            named.and_then(|p| p.schema.reference.as_deref()),
            Some("#/components/schemas/persons_namedQuery_parameter")
        );
    }

    #[test]
    fn get_by_id_uses_guid_path_parameter() {
        let config = ethos_config();
        let version = version();
        let ctx = RouteContext::default();
        let method = method("GET_ID");
        let op = OperationBuilder::new(&config, &version, &ctx, &method)
            .with_route_template("persons/{id}")
            .get_by_id();

        assert_eq!(op.summary, "Returns the requested resource from persons.");
        let id = &op.parameters[0];
        assert_eq!(id.location, ParameterLocation::Path);
        assert!(id.required);
        assert_eq!(id.schema.format.as_deref(), Some("guid"));
        assert!(!op.responses["200"].headers.contains_key("X-Total-Count"));
        assert_eq!(
            op.responses["200"].content["application/vnd.hedtech.integration.v12.1.0+json"]
                .schema
                .items
                .as_ref()
                .and_then(|s| s.reference.as_deref()),
            Some("#/components/schemas/persons_id_get_response")
        );
    }

    #[test]
    fn bpa_composite_key_uses_query_id() {
        let config = ApiConfiguration {
            resource_name: "x-leave-plans".to_string(),
            api_type: "T".to_string(),
            process_id: "LPN".to_string(),
            process_desc: "Leave Plans".to_string(),
            colleague_key_names: vec!["EMP".to_string(), "PLAN".to_string()],
            ..ApiConfiguration::default()
        };
        let version = version();
        let ctx = RouteContext::default();
        let method = method("DELETE");
        let op = OperationBuilder::new(&config, &version, &ctx, &method).delete();

        assert_eq!(op.summary, "Deletes requested resource from LPN - Leave Plans.");
        let id = &op.parameters[0];
        assert_eq!(id.location, ParameterLocation::Query);
        assert_eq!(id.description, COMPOSITE_ID_TEXT);
        assert!(op.responses.contains_key("204"));
        assert!(!op.responses.contains_key("200"));
    }

    #[test]
    fn spec_summaries_name_the_table() {
        let config = ApiConfiguration {
            resource_name: "x-widgets".to_string(),
            api_type: "A".to_string(),
            primary_application: "ST".to_string(),
            primary_entity: "WIDGETS".to_string(),
            primary_table_name: "WIDGET.TABLE".to_string(),
            ..ApiConfiguration::default()
        };
        let version = version();
        let ctx = RouteContext::default();
        let put = method("PUT");
        let builder = OperationBuilder::new(&config, &version, &ctx, &put);
        assert_eq!(
            builder.put().summary,
            "Updates requested resource from WIDGET.TABLE from ST-WIDGETS."
        );
        assert_eq!(builder.post().summary, "Creates a new resource in WIDGETS.");
        assert_eq!(
            builder.query().summary,
            "Returns requested resource from WIDGET.TABLE from ST-WIDGETS."
        );
    }

    #[test]
    fn explicit_summary_and_description_win() {
        let config = ethos_config();
        let version = version();
        let ctx = RouteContext::default();
        let method = SupportedMethod {
            method: "GET_ALL".to_string(),
            summary: format!("Read{SUB_VALUE_MARK}all"),
            description: r"Line one\nLine two".to_string(),
            permission: "VIEW.PERSON".to_string(),
            ..SupportedMethod::default()
        };
        let op = OperationBuilder::new(&config, &version, &ctx, &method).get();
        assert_eq!(op.summary, "Read all");
        assert_eq!(op.description, "Line one\nLine two");
        assert_eq!(
            op.extensions["x-method-permission"],
            Value::String("VIEW.PERSON".into())
        );
    }

    #[test]
    fn put_request_body_uses_requested_content_types() {
        let config = ethos_config();
        let version = version();
        let ctx = RouteContext {
            requested_content_types: vec!["application/json".to_string()],
            ..RouteContext::default()
        };
        let method = method("PUT");
        let op = OperationBuilder::new(&config, &version, &ctx, &method)
            .with_route_template("persons/{id}")
            .put();
        let body = op.request_body.expect("request body");
        assert_eq!(body.content.keys().collect::<Vec<_>>(), vec!["application/json"]);
        assert_eq!(
            body.content["application/json"]
                .schema
                .items
                .as_ref()
                .and_then(|s| s.reference.as_deref()),
            Some("#/components/schemas/persons_id_put_request")
        );
        assert_eq!(op.parameters[0].location, ParameterLocation::Path);
    }

    #[test]
    fn override_parameters_expand_page_and_template_arguments() {
        let config = ethos_config();
        let version = version();
        let mut ctx = RouteContext::default();
        ctx.query_names.insert("personFilter".to_string(), version.clone());
        let method = SupportedMethod {
            method: "GET_ALL".to_string(),
            arguments: vec![
                ("page".to_string(), "Paging".to_string()),
                ("personFilter".to_string(), "Person filter".to_string()),
                ("lastName".to_string(), "Last name".to_string()),
            ],
            ..SupportedMethod::default()
        };
        let builder =
            OperationBuilder::new(&config, &version, &ctx, &method).with_route_template("persons");
        let mut op = builder.get();
        builder.override_parameters(&mut op, "GET_ALL");

        let names: Vec<_> = op.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["limit", "offset", "personFilter", "lastName"]);
        assert_eq!(
            op.parameters[0].description,
            "The maximum number of resources requested for this result set.\n\n<b>/api/persons?limit={limit}</b>"
        );
        assert_eq!(
            op.parameters[2].schema.reference.as_deref(),
            Some("#/components/schemas/persons_personFilter_parameter")
        );
        assert_eq!(
            op.parameters[3].description,
            "Last name\n\n<b>/api/persons?lastName={lastName}</b>"
        );
        assert_eq!(op.parameters[3].schema.schema_type.as_deref(), Some("string"));
    }

    #[test]
    fn override_parameters_drop_query_arguments_for_writes() {
        let config = ethos_config();
        let version = version();
        let ctx = RouteContext::default();
        let method = SupportedMethod {
            method: "PUT".to_string(),
            arguments: vec![
                ("id".to_string(), "The id".to_string()),
                ("body".to_string(), "The body".to_string()),
            ],
            ..SupportedMethod::default()
        };
        let builder = OperationBuilder::new(&config, &version, &ctx, &method)
            .with_route_template("persons/{id}");
        let mut op = builder.put();
        builder.override_parameters(&mut op, "PUT");
        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].description, "The id");
    }

    #[test]
    fn override_responses_map_exceptions() {
        let config = ethos_config();
        let version = version();
        let ctx = RouteContext {
            use_v2_errors: true,
            ..RouteContext::default()
        };
        let method = SupportedMethod {
            method: "GET_ALL".to_string(),
            exceptions: vec![
                "HttpStatusCode.BadRequest Invalid criteria".to_string(),
                "HttpStatusCode.Forbidden Missing permission".to_string(),
                "400 second bad request".to_string(),
            ],
            ..SupportedMethod::default()
        };
        let builder = OperationBuilder::new(&config, &version, &ctx, &method);
        let mut op = builder.get();
        builder.override_responses(&mut op);

        let codes: Vec<_> = op.responses.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["200", "400", "401", "403", "404", "405", "406", "500"]);
        assert_eq!(
            op.responses["400"].description,
            "Failure. HttpStatusCode.BadRequest Invalid criteria"
        );
        assert!(op.responses["403"].content.contains_key(V2_ERROR_MEDIA_TYPE));
        assert!(op.responses["401"].content.is_empty());
    }

    #[test]
    fn v1_overrides_skip_405_and_406() {
        let config = ethos_config();
        let version = version();
        let ctx = RouteContext::default();
        let method = method("GET_ALL");
        let builder = OperationBuilder::new(&config, &version, &ctx, &method);
        let mut op = builder.get();
        builder.override_responses(&mut op);
        assert!(!op.responses.contains_key("405"));
        assert!(!op.responses.contains_key("406"));
        assert_eq!(
            op.responses["400"].content["application/json"].schema.reference.as_deref(),
            Some("#/components/schemas/errors")
        );
    }

    #[test]
    fn response_verbs() {
        assert_eq!(response_verb("GET_ALL"), "get");
        assert_eq!(response_verb("QAPI_POST"), "query");
        assert_eq!(response_verb("PUT"), "put");
        assert_eq!(response_verb(""), "query");
    }

    #[test]
    fn dates_parse_in_common_shapes() {
        assert!(parse_date("2024-06-30").is_some());
        assert!(parse_date("06/30/2024").is_some());
        assert!(parse_date("2024-06-30T10:00:00Z").is_some());
        assert!(parse_date("soon").is_none());
    }

    #[test]
    fn unescape_handles_common_escapes() {
        assert_eq!(unescape(r"a\tb\\c"), "a\tb\\c");
        assert_eq!(unescape(r"caf\u00e9"), "café");
        assert_eq!(unescape("plain"), "plain");
    }
}
