//! Project DTO descriptors into extensible data rows.
//!
//! A DTO is flattened depth-first: nested objects extend the JSON path
//! (`/addresses[]/`) and every leaf property becomes one
//! [`ExtensibleDataRow`]. Filter groups declared on an object property are
//! inherited by the rows beneath it.

use colleague_metadata_core::{
    ActionDescriptor, BaseType, Catalog, Enumeration, ExtensibleData, ExtensibleDataRow,
    FieldType, PropertyDescriptor, TypeDescriptor, STRING_LIST_TITLE,
};

/// Paths with more segments than this are not descended into.
const MAX_PATH_SEGMENTS: usize = 10;

/// Walks catalog types on behalf of the synthesizer.
#[derive(Debug, Clone, Copy)]
pub struct SchemaProjector<'a> {
    catalog: &'a Catalog,
}

impl<'a> SchemaProjector<'a> {
    /// A projector reading types from `catalog`.
    #[must_use]
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Replace `version`'s rows with those of the body `action` accepts.
    ///
    /// Untyped and string-list bodies yield the single `IEnumerable[]` row;
    /// scalar bodies yield nothing.
    pub fn project_request(&self, action: &ActionDescriptor, version: &mut ExtensibleData) {
        version.extended_data_list.clear();
        let Some(body) = &action.request_body else {
            return;
        };
        match &body.base {
            BaseType::Json => push_string_list_row(version),
            BaseType::String if body.list => push_string_list_row(version),
            BaseType::Named(name) => {
                self.project_type(name, action.uses_camel_case(), version);
            }
            _ => {}
        }
    }

    /// Replace `version`'s rows with those of the value `action` returns.
    ///
    /// Lists unwrap to their element. An untyped action result is described
    /// by the action's `criteria` query-string type when it has one.
    pub fn project_response(&self, action: &ActionDescriptor, version: &mut ExtensibleData) {
        version.extended_data_list.clear();
        let Some(returns) = &action.returns else {
            return;
        };
        let camel_case = action.uses_camel_case();
        match &returns.base {
            BaseType::ActionResult => {
                let criteria = action
                    .query_string_filters()
                    .filter(|(group, _)| *group == "criteria")
                    .map(|(_, type_name)| type_name)
                    .last();
                match criteria {
                    Some(type_name) => self.project_type(type_name, camel_case, version),
                    None => push_string_list_row(version),
                }
            }
            BaseType::Json => push_string_list_row(version),
            BaseType::Named(name) => self.project_type(name, camel_case, version),
            _ => {}
        }
    }

    /// Append the rows of DTO `type_name` to `version`.
    pub fn project_type(&self, type_name: &str, camel_case: bool, version: &mut ExtensibleData) {
        let Some(ty) = self.catalog.type_descriptor(type_name) else {
            tracing::debug!(type_name, "type not in catalog; nothing projected");
            return;
        };
        self.project_properties(ty, camel_case, "/", &[], version);
    }

    fn project_properties(
        &self,
        ty: &TypeDescriptor,
        camel_case: bool,
        path: &str,
        inherited: &[String],
        version: &mut ExtensibleData,
    ) {
        if path.split('/').count() > MAX_PATH_SEGMENTS {
            return;
        }
        for prop in ty.properties() {
            self.project_property(prop, camel_case, path, inherited, version);
        }
    }

    fn project_property(
        &self,
        prop: &PropertyDescriptor,
        camel_case: bool,
        path: &str,
        inherited: &[String],
        version: &mut ExtensibleData,
    ) {
        let field = &prop.field_type;
        let mut name = prop.display_name().to_string();
        let mut enum_values = Vec::new();
        let named = field.type_name().and_then(|n| self.catalog.type_descriptor(n));

        match named {
            Some(ty) if matches!(ty, TypeDescriptor::Class { .. }) => {
                if camel_case {
                    name = lower_first(&name);
                }
                let suffix = if field.list { "[]/" } else { "/" };
                let nested_path = format!("{path}{name}{suffix}");
                let mut filters = inherited.to_vec();
                filters.extend(prop.filter_names());
                self.project_properties(ty, camel_case, &nested_path, &filters, version);
                return;
            }
            Some(ty) => {
                // Lists of enums carry member names, scalars their wire values.
                enum_values = if field.list {
                    ty.enum_names()
                } else {
                    ty.enum_values()
                };
            }
            None if field.type_name().is_some() => {
                tracing::debug!(property = %prop.name, "property type not in catalog; skipped");
                return;
            }
            None => {}
        }

        if field.list {
            name.push_str("[]");
        }
        if camel_case {
            name = lower_first(&name);
        }

        let property_type = leaf_type(field, prop.date_only);
        let length = if property_type == "bool" {
            Some(5)
        } else {
            prop.max_length.filter(|len| *len > 0)
        };
        let mut row = ExtensibleDataRow::new(
            prop.column.clone(),
            prop.file.clone(),
            name,
            path,
            property_type,
            length,
        );
        row.description.clone_from(&prop.description);
        row.required = prop.required;
        row.trans_file.clone_from(&prop.ref_file);
        row.trans_column.clone_from(&prop.ref_column);
        row.trans_table.clone_from(&prop.ref_table);
        row.trans_type = translation_type(&prop.ref_file).to_string();
        if !enum_values.is_empty() {
            row.trans_type = "E".to_string();
            row.enumerations = enum_values.iter().map(|v| Enumeration::same(v)).collect();
        }
        let mut filters = inherited.to_vec();
        filters.extend(prop.filter_names());
        row.filter_names = filters;

        if prop.inquiry_only && !prop.column.is_empty() {
            version.inquiry_fields.push(prop.column.clone());
        }
        version.extended_data_list.push(row);
    }

    /// Dotted names of the properties of `type_name` in filter `group`.
    ///
    /// Parent (data contract) objects are descended into. When a parent
    /// property is itself in the group, every property beneath it is.
    #[must_use]
    pub fn filter_properties(&self, group: &str, type_name: &str) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(ty) = self.catalog.type_descriptor(type_name) {
            self.collect_filter_properties(group, ty, "", true, 0, &mut names);
        }
        names
    }

    fn collect_filter_properties(
        &self,
        group: &str,
        ty: &TypeDescriptor,
        base: &str,
        check_group: bool,
        depth: usize,
        names: &mut Vec<String>,
    ) {
        if depth > MAX_PATH_SEGMENTS {
            return;
        }
        let qualify = |name: &str| {
            if base.is_empty() {
                name.to_string()
            } else {
                format!("{base}.{name}")
            }
        };
        for prop in ty.properties() {
            let name = prop.display_name();
            let parent = prop
                .field_type
                .type_name()
                .and_then(|n| self.catalog.type_descriptor(n))
                .filter(|t| t.is_parent());
            match parent {
                Some(nested) => {
                    let check = check_group && !prop.is_filter(group);
                    self.collect_filter_properties(group, nested, &qualify(name), check, depth + 1, names);
                }
                None if !check_group || prop.is_filter(group) => names.push(qualify(name)),
                None => {}
            }
        }
    }
}

fn push_string_list_row(version: &mut ExtensibleData) {
    let mut row = ExtensibleDataRow::new("", "", STRING_LIST_TITLE, "/", "string", None);
    row.description = "List of type string for input.".to_string();
    row.required = true;
    version.extended_data_list.push(row);
}

/// Source type recorded for a leaf property.
fn leaf_type(field: &FieldType, date_only: bool) -> &'static str {
    match field.base {
        BaseType::Date | BaseType::DateTime if date_only => "date",
        BaseType::Date | BaseType::DateTime | BaseType::DateTimeOffset => "datetime",
        BaseType::Bool => "bool",
        BaseType::Int => "integer",
        BaseType::Long => "long",
        BaseType::Float => "float",
        BaseType::Decimal => "decimal",
        _ => "string",
    }
}

/// `T` for code tables, `F` for other files, empty when untranslated.
fn translation_type(ref_file: &str) -> &'static str {
    if ref_file.contains("VALCODES") {
        "T"
    } else if ref_file.is_empty() {
        ""
    } else {
        "F"
    }
}

pub(crate) fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
