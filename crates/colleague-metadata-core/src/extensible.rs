//! Extensible data: API configurations and their per-version schema rows.
//!
//! An [`ApiConfiguration`] describes a resource (EDM.EXTENSIONS); each
//! [`ExtensibleData`] describes one version of it (EDM.EXT.VERSIONS) as a
//! flat list of [`ExtensibleDataRow`]s keyed by JSON path.

use serde::{Deserialize, Serialize};

/// Value mark separating multi-valued descriptions.
pub const VALUE_MARK: char = '\u{FD}';
/// Sub-value mark separating multi-valued descriptions.
pub const SUB_VALUE_MARK: char = '\u{FC}';

/// An allowed value of an enumerated column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enumeration {
    /// Value exposed in the API.
    pub value: String,
    /// Value stored in the source column.
    pub colleague_value: String,
}

impl Enumeration {
    /// An enumeration whose API and stored values are the same.
    #[must_use]
    pub fn same(value: &str) -> Self {
        Self {
            value: value.to_string(),
            colleague_value: value.to_string(),
        }
    }
}

/// One field of a version's schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensibleDataRow {
    /// Source column.
    pub column_name: String,
    /// Source file.
    pub file_name: String,
    /// Leaf property name; a trailing `[]` marks an array of primitives.
    pub json_title: String,
    /// Path of the parent object, `/` separated, ending with `/`.
    pub json_path: String,
    /// Source type (`string`, `integer`, `date`, `bool` ...).
    pub json_property_type: String,
    /// Maximum length of the value.
    pub length: Option<usize>,
    /// Description.
    pub description: String,
    /// Display conversion (`MD2`, `D4/` ...).
    pub conversion: String,
    /// Translation type: `T` code table, `F` file, `E` enumeration, `G` guid.
    pub trans_type: String,
    /// Translation file.
    pub trans_file: String,
    /// Translation column.
    pub trans_column: String,
    /// Translation table.
    pub trans_table: String,
    /// Database usage (`K` key, `I` inquiry ...).
    pub usage: String,
    /// Value is required.
    pub required: bool,
    /// Allowed values.
    pub enumerations: Vec<Enumeration>,
    /// Filter groups inherited from the projected property.
    pub filter_names: Vec<String>,
}

impl ExtensibleDataRow {
    /// A row with the identifying columns set.
    #[must_use]
    pub fn new(
        column_name: impl Into<String>,
        file_name: impl Into<String>,
        json_title: impl Into<String>,
        json_path: impl Into<String>,
        json_property_type: impl Into<String>,
        length: Option<usize>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            file_name: file_name.into(),
            json_title: json_title.into(),
            json_path: json_path.into(),
            json_property_type: json_property_type.into(),
            length,
            ..Self::default()
        }
    }

    /// Path and title joined, without the leading `/` (`names[]/firstName`).
    #[must_use]
    pub fn full_json_path(&self) -> String {
        format!("{}{}", self.json_path.trim_start_matches('/'), self.json_title)
    }

    /// Whether the row sits under a `predefinedInputs` object.
    ///
    /// Such rows carry their default in `trans_type` and their candidate
    /// values, `;` separated, in `trans_file`.
    #[must_use]
    pub fn is_predefined_input(&self) -> bool {
        self.json_path.contains("predefinedInputs")
    }

    /// Description with value and sub-value marks replaced by spaces.
    #[must_use]
    pub fn clean_description(&self) -> String {
        self.description
            .replace([VALUE_MARK, SUB_VALUE_MARK], " ")
    }
}

/// A filterable field of a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRow {
    /// Source column.
    pub column_name: String,
    /// Source file.
    pub file_name: String,
    /// Leaf property name.
    pub json_title: String,
    /// Path of the parent object.
    pub json_path: String,
    /// Source type.
    pub json_property_type: String,
    /// Operators accepted by the filter.
    pub valid_operators: Vec<String>,
    /// Maximum length of the value.
    pub length: Option<usize>,
    /// Database usage (`K`, `I` ...).
    pub usage: String,
    /// Value is required.
    pub required: bool,
    /// File selected against.
    pub select_file: String,
    /// Translation column.
    pub trans_column: String,
    /// Translation file.
    pub trans_file: String,
    /// Translation table.
    pub trans_table: String,
    /// Allowed values.
    pub enumerations: Vec<Enumeration>,
    /// The row is a named query rather than a criteria filter.
    pub named_query: bool,
    /// Description.
    pub description: String,
}

impl FilterRow {
    /// Path and title joined, without the leading `/`.
    #[must_use]
    pub fn full_json_path(&self) -> String {
        format!("{}{}", self.json_path.trim_start_matches('/'), self.json_title)
    }
}

impl From<&ExtensibleDataRow> for FilterRow {
    fn from(row: &ExtensibleDataRow) -> Self {
        Self {
            column_name: row.column_name.clone(),
            file_name: row.file_name.clone(),
            json_title: row.json_title.clone(),
            json_path: row.json_path.clone(),
            json_property_type: row.json_property_type.clone(),
            valid_operators: Vec::new(),
            length: row.length,
            usage: row.usage.clone(),
            required: row.required,
            select_file: row.file_name.clone(),
            trans_column: row.trans_column.clone(),
            trans_file: row.trans_file.clone(),
            trans_table: row.trans_table.clone(),
            enumerations: row.enumerations.clone(),
            named_query: false,
            description: String::new(),
        }
    }
}

/// One version of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensibleData {
    /// Resource name.
    pub api_resource_name: String,
    /// Version number.
    pub api_version_number: String,
    /// Media type of the version (`application/vnd.hedtech.integration.v1+json`).
    pub extended_schema_type: String,
    /// Route template serving the version.
    pub route_template: String,
    /// Schema rows.
    pub extended_data_list: Vec<ExtensibleDataRow>,
    /// Filterable rows.
    pub extended_data_filter_list: Vec<FilterRow>,
    /// Columns that may only be read.
    pub inquiry_fields: Vec<String>,
    /// Methods supported by a specification-based version (`get`, `get_all` ...).
    pub http_methods_supported: Vec<String>,
    /// Description.
    pub description: String,
    /// Release status of the version.
    pub version_release_status: String,
    /// Deprecation date.
    pub deprecation_date: String,
    /// Deprecation notice text.
    pub deprecation_notice: String,
    /// Sunset date.
    pub sunset_date: String,
    /// Defined by the institution rather than delivered.
    pub is_custom_resource: bool,
    /// Resource this version is an alternate view of.
    pub parent_api: String,
}

impl ExtensibleData {
    /// An empty version of `resource`.
    #[must_use]
    pub fn new(
        resource: impl Into<String>,
        version: impl Into<String>,
        media_type: impl Into<String>,
        route_template: impl Into<String>,
    ) -> Self {
        Self {
            api_resource_name: resource.into(),
            api_version_number: version.into(),
            extended_schema_type: media_type.into(),
            route_template: route_template.into(),
            ..Self::default()
        }
    }

    /// Whether the version holds only the untyped `IEnumerable[]` input row.
    #[must_use]
    pub fn is_string_list(&self) -> bool {
        matches!(self.extended_data_list.as_slice(), [row] if row.json_title == STRING_LIST_TITLE)
    }
}

/// Title of the single row projected for untyped list bodies.
pub const STRING_LIST_TITLE: &str = "IEnumerable[]";

/// A method entry of an [`ApiConfiguration`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportedMethod {
    /// Method kind (`GET_ALL`, `PUT` ...).
    pub method: String,
    /// Permission code required.
    pub permission: String,
    /// Description.
    pub description: String,
    /// Operation summary.
    pub summary: String,
    /// Route template serving the version.
    pub route_template: String,
    /// Documented arguments in declaration order.
    pub arguments: Vec<(String, String)>,
    /// Documented failures.
    pub exceptions: Vec<String>,
    /// Description of the returned value.
    pub returns: String,
}

/// Resource-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfiguration {
    /// Resource name.
    pub resource_name: String,
    /// Set when the resource is an alternate view of another.
    pub parent_resource_name: String,
    /// Domain code.
    pub api_domain: String,
    /// `A` specification, `T` business process, `Ethos`, `Web-Ethos`,
    /// `Web-NonEthos` or `Legacy`.
    pub api_type: String,
    /// Intended audience.
    pub audience: String,
    /// Key columns.
    pub colleague_key_names: Vec<String>,
    /// Primary files.
    pub colleague_file_names: Vec<String>,
    /// Deprecation date.
    pub deprecated_on: String,
    /// Sunset date.
    pub sunset_on: String,
    /// Description.
    pub description: String,
    /// Supported methods.
    pub http_methods: Vec<SupportedMethod>,
    /// Maximum page size.
    pub page_limit: Option<u32>,
    /// Owning application.
    pub primary_application: String,
    /// Primary entity.
    pub primary_entity: String,
    /// GUID source file; empty when the resource has no GUID.
    pub primary_guid_source: String,
    /// Primary table.
    pub primary_table_name: String,
    /// Business process identifier.
    pub process_id: String,
    /// Business process description.
    pub process_desc: String,
    /// Release status.
    pub release_status: String,
}

impl ApiConfiguration {
    /// Specification-based API.
    #[must_use]
    pub fn is_spec(&self) -> bool {
        self.api_type.eq_ignore_ascii_case("A")
    }

    /// Business process API.
    #[must_use]
    pub fn is_bpa(&self) -> bool {
        self.api_type.eq_ignore_ascii_case("T")
    }

    /// Ethos data model API.
    #[must_use]
    pub fn is_ethos(&self) -> bool {
        self.api_type.eq_ignore_ascii_case("ethos")
    }

    /// Hand-coded API answering Ethos media types.
    #[must_use]
    pub fn is_ethos_enabled(&self) -> bool {
        self.api_type.eq_ignore_ascii_case("web-ethos")
    }

    /// Hand-coded web API, Ethos enabled or not.
    #[must_use]
    pub fn is_web(&self) -> bool {
        let ty = self.api_type.to_lowercase();
        ty == "web-nonethos" || ty == "web-ethos"
    }

    /// Legacy response shape (no paging headers).
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        let ty = self.api_type.to_lowercase();
        ty == "legacy" || ty == "web-nonethos" || ty == "web-ethos"
    }

    fn methods(&self) -> impl Iterator<Item = &str> {
        self.http_methods.iter().map(|m| m.method.as_str())
    }

    /// Only single-item reads are supported.
    #[must_use]
    pub fn get_by_id_only(&self) -> bool {
        match self.http_methods.as_slice() {
            [] => false,
            [only] => only.method.eq_ignore_ascii_case("get_id"),
            _ => !self
                .methods()
                .any(|m| m == "GET_ALL" || m == "GET" || m == "POST_QAPI"),
        }
    }

    /// Only collection reads are supported.
    #[must_use]
    pub fn get_all_only(&self) -> bool {
        matches!(self.http_methods.as_slice(), [only] if only.method.eq_ignore_ascii_case("get_all"))
    }

    /// Only creation (or query by POST) is supported.
    #[must_use]
    pub fn post_only(&self) -> bool {
        matches!(
            self.http_methods.as_slice(),
            [only] if only.method.eq_ignore_ascii_case("post_qapi") || only.method.eq_ignore_ascii_case("post")
        )
    }

    /// Business process API keyed by more than one column and no GUID.
    #[must_use]
    pub fn is_composite_key(&self) -> bool {
        self.colleague_key_names.len() > 1 && self.is_bpa() && self.primary_guid_source.is_empty()
    }

    /// Page limit, defaulting to 100.
    #[must_use]
    pub fn page_limit_or_default(&self) -> u32 {
        self.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }
}

/// Page limit used when a resource declares none.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// A resource version that has been deprecated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeprecatedResource {
    /// Resource name.
    pub name: String,
    /// Deprecated representations.
    pub representations: Vec<DeprecatedRepresentation>,
}

/// A deprecated representation of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeprecatedRepresentation {
    /// Media type of the representation.
    pub x_media_type: String,
    /// Notice published for the representation.
    pub deprecation_notice: DeprecationNotice,
}

/// Deprecation details published in resource discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeprecationNotice {
    /// Deprecation date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_on: Option<String>,
    /// Sunset date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset_on: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str) -> SupportedMethod {
        SupportedMethod {
            method: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn full_json_path_drops_leading_slash() {
        let row = ExtensibleDataRow::new("NAME", "PERSON", "firstName", "/names[]/", "string", None);
        assert_eq!(row.full_json_path(), "names[]/firstName");
        let root = ExtensibleDataRow::new("", "", "id", "/", "string", None);
        assert_eq!(root.full_json_path(), "id");
    }

    #[test]
    fn predefined_inputs_and_description_marks() {
        let mut row = ExtensibleDataRow::new("", "", "mode", "/predefinedInputs/", "string", None);
        row.description = format!("a{VALUE_MARK}b{SUB_VALUE_MARK}c");
        assert!(row.is_predefined_input());
        assert_eq!(row.clean_description(), "a b c");
    }

    #[test]
    fn api_type_predicates() {
        let mut config = ApiConfiguration {
            api_type: "T".into(),
            colleague_key_names: vec!["A".into(), "B".into()],
            ..Default::default()
        };
        assert!(config.is_bpa());
        assert!(config.is_composite_key());
        config.primary_guid_source = "PERSON".into();
        assert!(!config.is_composite_key());

        config.api_type = "Web-Ethos".into();
        assert!(config.is_web());
        assert!(config.is_legacy());
        assert!(config.is_ethos_enabled());
        assert!(!config.is_ethos());
    }

    #[test]
    fn method_support_predicates() {
        let mut config = ApiConfiguration {
            http_methods: vec![method("get_id")],
            ..Default::default()
        };
        assert!(config.get_by_id_only());

        config.http_methods = vec![method("GET_ID"), method("PUT")];
        assert!(config.get_by_id_only());

        config.http_methods = vec![method("GET_ALL"), method("PUT")];
        assert!(!config.get_by_id_only());

        config.http_methods = vec![method("get_all")];
        assert!(config.get_all_only());

        config.http_methods = vec![method("POST_QAPI")];
        assert!(config.post_only());
        assert_eq!(config.page_limit_or_default(), 100);
    }
}
