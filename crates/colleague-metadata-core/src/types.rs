//! DTO type descriptors.
//!
//! A DTO is either a class with ordered properties or an enum. Property
//! types are written as short strings in the catalog (`string`, `int?`,
//! `Address[]`) and parsed into [`FieldType`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A named DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// Object with properties.
    Class {
        /// Data-contract type. Parent types are descended into when listing filters.
        #[serde(default)]
        is_parent: bool,
        /// Properties in declaration order.
        #[serde(default)]
        properties: Vec<PropertyDescriptor>,
    },
    /// Enumeration.
    Enum {
        /// Members in declaration order.
        #[serde(default)]
        members: Vec<EnumMember>,
    },
}

impl TypeDescriptor {
    /// Properties of a class; empty for enums.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        match self {
            Self::Class { properties, .. } => properties,
            Self::Enum { .. } => &[],
        }
    }

    /// Whether this is a parent (data-contract) class.
    #[must_use]
    pub const fn is_parent(&self) -> bool {
        matches!(self, Self::Class { is_parent: true, .. })
    }

    /// Wire values of an enum. A member's explicit value wins over its name.
    #[must_use]
    pub fn enum_values(&self) -> Vec<String> {
        match self {
            Self::Enum { members } => members
                .iter()
                .map(|m| m.value.clone().unwrap_or_else(|| m.name.clone()))
                .collect(),
            Self::Class { .. } => Vec::new(),
        }
    }

    /// Member names of an enum, ignoring explicit wire values.
    #[must_use]
    pub fn enum_names(&self) -> Vec<String> {
        match self {
            Self::Enum { members } => members.iter().map(|m| m.name.clone()).collect(),
            Self::Class { .. } => Vec::new(),
        }
    }
}

/// An enum member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member name.
    pub name: String,
    /// Value written on the wire, when it differs from the name.
    #[serde(default)]
    pub value: Option<String>,
}

/// A DTO property and its column documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Member name.
    pub name: String,
    /// Name written on the wire, when it differs from `name`.
    #[serde(default)]
    pub json_name: Option<String>,
    /// Declared type.
    #[serde(rename = "type", default = "FieldType::string")]
    pub field_type: FieldType,
    /// Column description.
    #[serde(default)]
    pub description: String,
    /// Source column.
    #[serde(default)]
    pub column: String,
    /// Source file.
    #[serde(default)]
    pub file: String,
    /// Maximum column length.
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Translation file.
    #[serde(default)]
    pub ref_file: String,
    /// Translation column.
    #[serde(default)]
    pub ref_column: String,
    /// Translation table.
    #[serde(default)]
    pub ref_table: String,
    /// Column may only be read.
    #[serde(default)]
    pub inquiry_only: bool,
    /// Column is required.
    #[serde(default)]
    pub required: bool,
    /// Filter groups the property belongs to.
    #[serde(default)]
    pub filters: Vec<String>,
    /// Filter membership is ignored.
    #[serde(default)]
    pub ignore_filter: bool,
    /// Date values carry no time component.
    #[serde(default)]
    pub date_only: bool,
}

impl PropertyDescriptor {
    /// Name written on the wire.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.json_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }

    /// Whether the property belongs to a filter group.
    #[must_use]
    pub fn is_filter(&self, group: &str) -> bool {
        !self.ignore_filter && self.filters.iter().any(|f| f == group)
    }

    /// Filter groups inherited by rows projected from this property.
    #[must_use]
    pub fn filter_names(&self) -> Vec<String> {
        if self.ignore_filter {
            return Vec::new();
        }
        self.filters.iter().filter(|f| !f.is_empty()).cloned().collect()
    }
}

/// Primitive or named base of a [`FieldType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// Text.
    String,
    /// Boolean.
    Bool,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    /// Single precision float.
    Float,
    /// Decimal number.
    Decimal,
    /// Calendar date (rendered as date or datetime depending on `date_only`).
    Date,
    /// Date and time.
    DateTime,
    /// Date and time with offset.
    DateTimeOffset,
    /// Untyped JSON payload.
    Json,
    /// Untyped action result (resolved through the `criteria` filter type).
    ActionResult,
    /// Another DTO in the catalog.
    Named(String),
}

/// A parsed property or action type such as `int?` or `Address[]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldType {
    /// Element type.
    pub base: BaseType,
    /// `?` suffix.
    pub nullable: bool,
    /// `[]` suffix.
    pub list: bool,
}

impl FieldType {
    /// Plain non-nullable string.
    #[must_use]
    pub const fn string() -> Self {
        Self {
            base: BaseType::String,
            nullable: false,
            list: false,
        }
    }

    /// Name of the referenced DTO, if any.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match &self.base {
            BaseType::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        let list = rest.ends_with("[]");
        if list {
            rest = &rest[..rest.len() - 2];
        }
        let nullable = rest.ends_with('?');
        if nullable {
            rest = &rest[..rest.len() - 1];
        }
        if rest.is_empty() || rest.contains(|c: char| c.is_whitespace() || c == '[' || c == '?') {
            return Err(Error::InvalidFieldType(s.to_string()));
        }
        let base = match rest.to_lowercase().as_str() {
            "string" | "strings" => BaseType::String,
            "bool" | "boolean" => BaseType::Bool,
            "int" | "integer" => BaseType::Int,
            "long" => BaseType::Long,
            "float" => BaseType::Float,
            "decimal" => BaseType::Decimal,
            "date" => BaseType::Date,
            "datetime" => BaseType::DateTime,
            "datetime_offset" => BaseType::DateTimeOffset,
            "json" => BaseType::Json,
            "action_result" => BaseType::ActionResult,
            _ => BaseType::Named(rest.to_string()),
        };
        // `strings` is shorthand for a list of strings.
        let list = list || rest.eq_ignore_ascii_case("strings");
        Ok(Self {
            base,
            nullable,
            list,
        })
    }
}

impl TryFrom<String> for FieldType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match &self.base {
            BaseType::String => "string",
            BaseType::Bool => "bool",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Float => "float",
            BaseType::Decimal => "decimal",
            BaseType::Date => "date",
            BaseType::DateTime => "datetime",
            BaseType::DateTimeOffset => "datetime_offset",
            BaseType::Json => "json",
            BaseType::ActionResult => "action_result",
            BaseType::Named(name) => name,
        };
        f.write_str(base)?;
        if self.nullable {
            f.write_str("?")?;
        }
        if self.list {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixes() {
        let ty: FieldType = "int?".parse().unwrap();
        assert_eq!(ty.base, BaseType::Int);
        assert!(ty.nullable);
        assert!(!ty.list);

        let ty: FieldType = "Address[]".parse().unwrap();
        assert_eq!(ty.type_name(), Some("Address"));
        assert!(ty.list);

        let ty: FieldType = "strings".parse().unwrap();
        assert_eq!(ty.base, BaseType::String);
        assert!(ty.list);
    }

    #[test]
    fn rejects_malformed_types() {
        assert!("".parse::<FieldType>().is_err());
        assert!("int[][]".parse::<FieldType>().is_err());
        assert!("two words".parse::<FieldType>().is_err());
    }

    #[test]
    fn display_matches_input_shape() {
        for text in ["datetime_offset?", "Person[]", "bool"] {
            let ty: FieldType = text.parse().unwrap();
            assert_eq!(ty.to_string(), text);
        }
    }

    #[test]
    fn property_display_name_and_filters() {
        let prop: PropertyDescriptor = serde_yaml_ng::from_str(
            "name: Title\njson_name: title\ntype: string\nfilters: [criteria]\n",
        )
        .unwrap();
        assert_eq!(prop.display_name(), "title");
        assert!(prop.is_filter("criteria"));
        assert_eq!(prop.filter_names(), vec!["criteria"]);

        let ignored = PropertyDescriptor {
            ignore_filter: true,
            ..prop
        };
        assert!(!ignored.is_filter("criteria"));
        assert!(ignored.filter_names().is_empty());
    }

    #[test]
    fn enum_values_prefer_wire_value() {
        let ty: TypeDescriptor = serde_yaml_ng::from_str(
            "kind: enum\nmembers:\n  - name: Active\n    value: active\n  - name: Inactive\n",
        )
        .unwrap();
        assert_eq!(ty.enum_values(), vec!["active", "Inactive"]);
        assert_eq!(ty.enum_names(), vec!["Active", "Inactive"]);
    }
}
