//! OpenAPI 3.0 document model.
//!
//! Only the parts of OpenAPI the synthesizer emits are modelled. Every map
//! is a `BTreeMap`, so serialized documents are byte-stable across runs.
//! Vendor extensions (`x-*`) are flattened into their owning object.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OpenAPI version written to every document.
pub const OPENAPI_VERSION: &str = "3.0.1";

/// Vendor extensions keyed by their `x-` name.
pub type Extensions = BTreeMap<String, Value>;

/// Security requirement: scheme name to scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// A complete OpenAPI document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version.
    pub openapi: String,
    /// Document metadata.
    pub info: Info,
    /// Servers hosting the API.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Paths keyed by URL template.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    /// Reusable schemas and security schemes.
    #[serde(default, skip_serializing_if = "Components::is_empty")]
    pub components: Components,
    /// Document-level security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

impl OpenApiDocument {
    /// An empty document with the given metadata and servers.
    #[must_use]
    pub fn new(info: Info, servers: Vec<Server>) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            servers,
            paths: BTreeMap::new(),
            components: Components::default(),
            security: Vec::new(),
        }
    }

    /// The `x-api-type` extension of the document's info.
    #[must_use]
    pub fn api_type(&self) -> Option<&str> {
        self.info.extension("x-api-type")
    }

    /// The `x-source-domain` extension of the document's info.
    #[must_use]
    pub fn source_domain(&self) -> Option<&str> {
        self.info.extension("x-source-domain")
    }

    /// Serialize as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`](crate::Error::Yaml) if serialization fails.
    pub fn to_yaml(&self) -> crate::Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Convert to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json_value(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API name.
    pub title: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// API version.
    pub version: String,
    /// License.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// Vendor extensions.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Info {
    /// A string extension.
    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&str> {
        self.extensions.get(key).and_then(Value::as_str)
    }

    /// Set a string extension.
    pub fn set_extension(&mut self, key: &str, value: impl Into<String>) {
        self.extensions
            .insert(key.to_string(), Value::String(value.into()));
    }
}

/// License information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// License name or copyright line.
    pub name: String,
    /// License URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A server hosting the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// URL, possibly templated.
    pub url: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Template variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, ServerVariable>,
}

/// A server URL template variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVariable {
    /// Default substitution.
    pub default: String,
}

/// Operations available on a path, serialized in get, put, post, delete order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

impl PathItem {
    /// Whether no operation is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.get.is_none() && self.put.is_none() && self.post.is_none() && self.delete.is_none()
    }

    /// The operation slot for an HTTP verb.
    #[must_use]
    pub fn slot(&mut self, verb: OperationVerb) -> &mut Option<Operation> {
        match verb {
            OperationVerb::Get => &mut self.get,
            OperationVerb::Put => &mut self.put,
            OperationVerb::Post => &mut self.post,
            OperationVerb::Delete => &mut self.delete,
        }
    }
}

/// HTTP verbs an operation can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationVerb {
    /// GET.
    Get,
    /// PUT.
    Put,
    /// POST.
    Post,
    /// DELETE.
    Delete,
}

/// A single API operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Grouping tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Summary.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    /// Security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Vendor extensions.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string.
    Query,
    /// Path segment.
    Path,
    /// Request header.
    Header,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Value schema.
    pub schema: Schema,
}

/// An operation request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Body schema keyed by media type.
    pub content: BTreeMap<String, MediaType>,
}

/// A response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description.
    pub description: String,
    /// Response headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Header>,
    /// Body schema keyed by media type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

impl Response {
    /// A response with only a description.
    #[must_use]
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

/// A response header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Description.
    pub description: String,
    /// Whether the header is always present.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Value schema.
    pub schema: Schema,
}

/// Schema of one media type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Body schema.
    pub schema: Schema,
}

/// A JSON schema, restricted to the keywords the builders emit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Reference to a component schema.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// JSON type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Format (`guid`, `date`, `MD2` ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<Value>,
    /// Array element schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Object properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    /// Required property names.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub required: BTreeSet<String>,
    /// Vendor extensions.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Schema {
    /// A schema of the given JSON type.
    #[must_use]
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    /// A reference to `#/components/schemas/{name}`.
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{name}")),
            ..Self::default()
        }
    }

    /// An array of `items`.
    #[must_use]
    pub fn array_of(items: Self) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// An object with no properties yet.
    #[must_use]
    pub fn object() -> Self {
        Self::typed("object")
    }

    /// Builder-style description setter.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the schema is of the given JSON type.
    #[must_use]
    pub fn is_type(&self, schema_type: &str) -> bool {
        self.schema_type.as_deref() == Some(schema_type)
    }
}

/// Reusable components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Schemas keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
    /// Security schemes keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

impl Components {
    /// Whether nothing is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.security_schemes.is_empty()
    }

    /// Add every entry of `other` whose key is not already present.
    pub fn merge_missing(&mut self, other: Self) {
        for (key, schema) in other.schemas {
            self.schemas.entry(key).or_insert(schema);
        }
        for (key, scheme) in other.security_schemes {
            self.security_schemes.entry(key).or_insert(scheme);
        }
    }
}

/// An authentication scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// Scheme type (`http`).
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// Header name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Where the credential is sent.
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,
    /// HTTP auth scheme (`bearer`, `basic`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn info_extensions_flatten() {
        let mut info = Info {
            title: "persons".into(),
            version: "12.1.0".into(),
            ..Default::default()
        };
        info.set_extension("x-api-type", "ethos");
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            json!({"title": "persons", "version": "12.1.0", "x-api-type": "ethos"})
        );
        let back: Info = serde_json::from_value(value).unwrap();
        assert_eq!(back.extension("x-api-type"), Some("ethos"));
    }

    #[test]
    fn schema_serializes_keywords_only_when_set() {
        let mut schema = Schema::array_of(Schema::reference("persons_get_response"));
        schema.required.insert("id".into());
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "array",
                "items": {"$ref": "#/components/schemas/persons_get_response"},
                "required": ["id"]
            })
        );
    }

    #[test]
    fn path_item_operations_keep_verb_order() {
        let mut item = PathItem::default();
        *item.slot(OperationVerb::Delete) = Some(Operation::default());
        *item.slot(OperationVerb::Get) = Some(Operation::default());
        let yaml = serde_yaml_ng::to_string(&item).unwrap();
        let get = yaml.find("get:").unwrap();
        let delete = yaml.find("delete:").unwrap();
        assert!(get < delete);
    }

    #[test]
    fn components_merge_keeps_existing_keys() {
        let mut target = Components::default();
        target
            .schemas
            .insert("a".into(), Schema::typed("string"));
        let mut other = Components::default();
        other.schemas.insert("a".into(), Schema::typed("integer"));
        other.schemas.insert("b".into(), Schema::typed("boolean"));

        target.merge_missing(other);
        assert!(target.schemas["a"].is_type("string"));
        assert!(target.schemas["b"].is_type("boolean"));
    }
}
