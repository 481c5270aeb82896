//! Convert extensible data rows into component schemas.
//!
//! Rows are flat (`names[]/firstName`); the tree builders fold them back
//! into nested objects and arrays. A segment ending in `[]` becomes an array
//! whose `items` object holds the children. The first row to claim a
//! property name wins.

use colleague_metadata_core::{ApiConfiguration, ExtensibleData, ExtensibleDataRow};
use serde_json::Value;

use crate::model::Schema;

/// Lower-case GUID pattern.
pub const GUID_PATTERN: &str = "^[a-f0-9]{8}(?:-[a-f0-9]{4}){3}-[a-f0-9]{12}$";

/// Length of a hyphenated GUID.
const GUID_LENGTH: usize = 36;

const DATE_PATTERN: &str =
    "^(-?(?:[1-9][0-9]*)?[0-9]{4})-(1[0-2]|0[1-9])-(3[0-1]|0[1-9]|[1-2][0-9])$";

const DATE_TIME_PATTERN: &str = "^(-?(?:[1-9][0-9]*)?[0-9]{4})-(1[0-2]|0[1-9])-(3[0-1]|0[1-9]|[1-2][0-9])T(2[0-3]|[0-1][0-9]):([0-5][0-9]):([0-5][0-9])(\\.[0-9]+)?(Z|[+-](?:2[0-3]|[0-1][0-9]):[0-5][0-9])?$";

/// What a main schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaUse {
    /// A response body.
    Read,
    /// A PUT request body.
    Put,
    /// A POST request body.
    Post,
}

impl SchemaUse {
    const fn is_write(self) -> bool {
        matches!(self, Self::Put | Self::Post)
    }
}

/// Map a row's source type to a JSON schema type.
///
/// A title ending in `[]` is always an array. `number` columns are integers
/// unless their conversion carries decimals.
#[must_use]
pub fn json_schema_type(property_type: &str, title: &str, conversion: &str) -> String {
    if title.ends_with("[]") {
        return "array".to_string();
    }
    if property_type.is_empty() {
        return "string".to_string();
    }
    let lower = property_type.to_lowercase();
    match lower.as_str() {
        "decimal" => "number".to_string(),
        "long" => "integer".to_string(),
        "number" if conversion.is_empty() || conversion.eq_ignore_ascii_case("MD0") => {
            "integer".to_string()
        }
        "number" => "number".to_string(),
        "bool" => "boolean".to_string(),
        "date" | "time" | "datetime" => "string".to_string(),
        _ => lower,
    }
}

/// Pattern implied by a row's source type.
#[must_use]
pub fn type_pattern(property_type: &str) -> Option<&'static str> {
    match property_type.to_lowercase().as_str() {
        "date" => Some(DATE_PATTERN),
        "datetime" => Some(DATE_TIME_PATTERN),
        _ => None,
    }
}

/// Schema of a single row.
///
/// With `lineage` set, source column and lookup file are recorded in
/// `x-lineageReferenceObject` and `x-lineageLookupReferenceObject`.
#[must_use]
pub fn row_schema(row: &ExtensibleDataRow, lineage: bool) -> Schema {
    let schema_type = json_schema_type(&row.json_property_type, &row.json_title, &row.conversion);
    let mut schema = Schema::typed(&schema_type);
    if schema_type == "string" {
        schema.max_length = row.length;
    }
    if schema_type == "array" {
        schema.items = Some(Box::new(Schema {
            max_length: row.length,
            ..Schema::typed("string")
        }));
    }
    if !row.description.is_empty() {
        schema.description = Some(row.clean_description());
    }

    let source_type = row.json_property_type.to_lowercase();
    if source_type == "date" || source_type == "date-time" {
        schema.max_length = None;
    } else if !row.trans_type.is_empty() {
        if row.trans_type.eq_ignore_ascii_case("G") {
            schema.pattern = Some(GUID_PATTERN.to_string());
            schema.max_length = Some(GUID_LENGTH);
            schema.format = Some("guid".to_string());
        }
    } else if !row.conversion.is_empty() {
        schema.format = Some(row.conversion.clone());
    }
    if schema.pattern.is_none() {
        schema.pattern = type_pattern(&row.json_property_type).map(str::to_string);
    }

    if !row.json_title.is_empty() {
        let title = row.json_title.replace("[]", "");
        schema.title = Some(if title.is_empty() {
            row.json_title.clone()
        } else {
            upper_first(&title)
        });
    }

    let predefined = row.is_predefined_input();
    let translated_column = row.column_name.ends_with(".TRANSLATION");
    if lineage && !predefined {
        if !row.column_name.is_empty() {
            if !translated_column {
                schema.extensions.insert(
                    "x-lineageReferenceObject".to_string(),
                    Value::String(row.column_name.clone()),
                );
            } else if !row.trans_column.is_empty() {
                schema.extensions.insert(
                    "x-lineageReferenceObject".to_string(),
                    Value::String(row.trans_column.clone()),
                );
            }
        }
        if !row.trans_file.is_empty() && !translated_column {
            let lookup = if row.trans_table.is_empty() {
                row.trans_file.clone()
            } else {
                format!("{} - {}", row.trans_file, row.trans_table)
            };
            schema.extensions.insert(
                "x-lineageLookupReferenceObject".to_string(),
                Value::String(lookup),
            );
        }
    }

    if predefined {
        schema.default = Some(Value::String(row.trans_type.clone()));
        if !row.trans_file.is_empty() {
            schema
                .enumeration
                .extend(row.trans_file.split(';').map(|v| Value::String(v.to_string())));
        }
    }
    schema.enumeration.extend(
        row.enumerations
            .iter()
            .map(|e| Value::String(e.value.clone())),
    );
    schema
}

/// Main body schema of a version.
///
/// Adds the `id` property (GUID, single key or composite key object) and
/// leaves out inquiry-only columns from write bodies and predefined inputs
/// from read bodies.
#[must_use]
pub fn main_schema(config: &ApiConfiguration, version: &ExtensibleData, usage: SchemaUse) -> Schema {
    let mut root = Schema::object();
    if version.is_string_list() {
        root.schema_type = Some("string".to_string());
        return root;
    }

    let mut rows: Vec<&ExtensibleDataRow> = version.extended_data_list.iter().collect();
    if !config.primary_guid_source.is_empty() {
        root.properties.insert(
            "id".to_string(),
            Schema {
                title: Some("ID".to_string()),
                format: Some("guid".to_string()),
                description: Some("The global identifier for the resource.".to_string()),
                pattern: Some(GUID_PATTERN.to_string()),
                ..Schema::typed("string")
            },
        );
        if usage != SchemaUse::Put {
            root.required.insert("id".to_string());
        }
    } else if config.is_bpa() {
        let id = if config.is_composite_key() {
            let mut id = Schema {
                title: Some("ID".to_string()),
                description: Some("The identifiers for the resource".to_string()),
                ..Schema::object()
            };
            for key in &config.colleague_key_names {
                if let Some(pos) = rows.iter().position(|r| &r.column_name == key) {
                    let row = rows.remove(pos);
                    id.properties
                        .insert(row.json_title.replace("[]", ""), row_schema(row, true));
                }
            }
            id
        } else {
            let key = config.colleague_key_names.first().cloned().unwrap_or_default();
            let info = rows.iter().find(|r| r.column_name == key);
            let file = config.colleague_file_names.first().cloned().unwrap_or_default();
            let mut row = ExtensibleDataRow::new(
                key.clone(),
                file,
                "id",
                "/",
                "string",
                info.and_then(|r| r.length),
            );
            row.description = "The identifier for the resource".to_string();
            if let Some(info) = info {
                row.conversion.clone_from(&info.conversion);
                row.trans_column.clone_from(&info.trans_column);
                row.trans_file.clone_from(&info.trans_file);
                row.trans_table.clone_from(&info.trans_table);
            }
            row_schema(&row, true)
        };
        root.properties.insert("id".to_string(), id);
        if usage != SchemaUse::Put {
            root.required.insert("id".to_string());
        }
    }

    for row in rows {
        if usage.is_write()
            && (row.usage != "K" || usage == SchemaUse::Put)
            && version.inquiry_fields.contains(&row.column_name)
        {
            continue;
        }
        if !usage.is_write() && row.is_predefined_input() {
            continue;
        }
        insert_row(&mut root, &row.full_json_path(), row_schema(row, true), row.required);
    }
    root
}

/// Schema of the `id` query parameter of a composite-key resource.
#[must_use]
pub fn id_schema(config: &ApiConfiguration, version: &ExtensibleData) -> Schema {
    let mut schema = Schema::object();
    let rows = sorted_rows(version);
    for key in &config.colleague_key_names {
        if let Some(row) = rows.iter().find(|r| &r.column_name == key) {
            let name = row.json_title.replace("[]", "");
            schema.properties.insert(name.clone(), row_schema(row, true));
            schema.required.insert(name);
        }
    }
    schema
}

/// Schema of a filter parameter or query request body.
///
/// With a non-empty `query_name`, rows projected outside that filter group
/// are left out, except for specification and business process APIs whose
/// rows carry no groups.
#[must_use]
pub fn filter_schema(config: &ApiConfiguration, version: &ExtensibleData, query_name: &str) -> Schema {
    let mut schema = Schema::object();
    if version.is_string_list() {
        schema.schema_type = Some("string".to_string());
        return schema;
    }
    let rows = sorted_rows(version);
    let grouped = !query_name.is_empty() && !config.is_spec() && !config.is_bpa();
    for filter in &version.extended_data_filter_list {
        let Some(row) = rows
            .iter()
            .find(|r| r.json_path == filter.json_path && r.json_title == filter.json_title)
        else {
            continue;
        };
        if grouped && !row.filter_names.iter().any(|n| n == query_name) {
            continue;
        }
        insert_row(&mut schema, &row.full_json_path(), row_schema(row, true), false);
    }
    schema
}

/// Schema of the `namedQuery` parameter.
#[must_use]
pub fn named_query_schema(version: &ExtensibleData) -> Schema {
    let mut schema = Schema::object();
    for query in version.extended_data_filter_list.iter().filter(|f| f.named_query) {
        let mut row = ExtensibleDataRow::new(
            query.column_name.clone(),
            query.file_name.clone(),
            query.json_title.clone(),
            query.json_path.clone(),
            query.json_property_type.clone(),
            query.length,
        );
        row.description.clone_from(&query.description);
        schema
            .properties
            .entry(row.json_title.replace("[]", ""))
            .or_insert_with(|| row_schema(&row, false));
    }
    schema
}

fn sorted_rows(version: &ExtensibleData) -> Vec<&ExtensibleDataRow> {
    let mut rows: Vec<&ExtensibleDataRow> = version.extended_data_list.iter().collect();
    rows.sort_by_cached_key(|r| r.full_json_path());
    rows
}

/// The object that holds children of `schema`: its `items` for arrays.
fn container(schema: &mut Schema) -> &mut Schema {
    if schema.is_type("array") {
        schema.items.get_or_insert_with(|| Box::new(Schema::object()))
    } else {
        schema
    }
}

/// Insert `leaf` at a `/` separated path, creating intermediate nodes.
fn insert_row(root: &mut Schema, path: &str, leaf: Schema, required: bool) {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut node = root;
    for segment in parents {
        node = container(node)
            .properties
            .entry(segment.replace("[]", ""))
            .or_insert_with(|| {
                if segment.contains("[]") {
                    Schema::typed("array")
                } else {
                    Schema::object()
                }
            });
    }
    let holder = container(node);
    let key = last.replace("[]", "");
    if holder.properties.contains_key(&key) {
        return;
    }
    holder.properties.insert(key.clone(), leaf);
    if required {
        holder.required.insert(key);
    }
}

fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use colleague_metadata_core::{Enumeration, FilterRow, STRING_LIST_TITLE};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(column: &str, title: &str, path: &str, ty: &str) -> ExtensibleDataRow {
        ExtensibleDataRow::new(column, "PERSON", title, path, ty, Some(10))
    }

    fn version(rows: Vec<ExtensibleDataRow>) -> ExtensibleData {
        ExtensibleData {
            extended_data_list: rows,
            ..Default::default()
        }
    }

    #[test]
    fn schema_types() {
        assert_eq!(json_schema_type("string", "tags[]", ""), "array");
        assert_eq!(json_schema_type("", "x", ""), "string");
        assert_eq!(json_schema_type("decimal", "x", ""), "number");
        assert_eq!(json_schema_type("long", "x", ""), "integer");
        assert_eq!(json_schema_type("number", "x", "MD0"), "integer");
        assert_eq!(json_schema_type("number", "x", "MD2"), "number");
        assert_eq!(json_schema_type("Bool", "x", ""), "boolean");
        assert_eq!(json_schema_type("datetime", "x", ""), "string");
        assert_eq!(json_schema_type("integer", "x", ""), "integer");
    }

    #[test]
    fn row_schema_with_lineage_and_guid() {
        let mut r = row("PERSON.ID", "personId", "/", "string");
        r.trans_type = "G".into();
        r.trans_file = "PERSON".into();
        r.trans_table = "TBL".into();
        r.description = "The person".into();
        let schema = serde_json::to_value(row_schema(&r, true)).unwrap();
        assert_eq!(
            schema,
            json!({
                "type": "string",
                "title": "PersonId",
                "description": "The person",
                "format": "guid",
                "pattern": GUID_PATTERN,
                "maxLength": 36,
                "x-lineageReferenceObject": "PERSON.ID",
                "x-lineageLookupReferenceObject": "PERSON - TBL"
            })
        );
    }

    #[test]
    fn row_schema_dates_and_translations() {
        let date = row_schema(&row("BIRTH", "birthDate", "/", "date"), false);
        assert_eq!(date.max_length, None);
        assert_eq!(date.pattern.as_deref(), Some(DATE_PATTERN));

        let mut translated = row("STATUS.TRANSLATION", "status", "/", "string");
        translated.trans_column = "STATUS".into();
        translated.trans_file = "ST.VALCODES".into();
        let schema = row_schema(&translated, true);
        assert_eq!(
            schema.extensions.get("x-lineageReferenceObject"),
            Some(&json!("STATUS"))
        );
        assert!(!schema.extensions.contains_key("x-lineageLookupReferenceObject"));

        let mut amount = row("AMT", "amount", "/", "number");
        amount.conversion = "MD2".into();
        let schema = row_schema(&amount, false);
        assert!(schema.is_type("number"));
        assert_eq!(schema.format.as_deref(), Some("MD2"));
    }

    #[test]
    fn predefined_inputs_and_enumerations() {
        let mut r = row("MODE", "mode", "/predefinedInputs/", "string");
        r.trans_type = "A".into();
        r.trans_file = "A;B".into();
        let schema = row_schema(&r, true);
        assert_eq!(schema.default, Some(json!("A")));
        assert_eq!(schema.enumeration, vec![json!("A"), json!("B")]);
        assert!(schema.extensions.is_empty());

        let mut status = row("", "status", "/", "string");
        status.enumerations = vec![Enumeration::same("active")];
        assert_eq!(row_schema(&status, true).enumeration, vec![json!("active")]);
    }

    #[test]
    fn main_schema_nests_rows_and_collects_required() {
        let config = ApiConfiguration {
            primary_guid_source: "PERSON".into(),
            ..Default::default()
        };
        let mut first = row("FIRST", "firstName", "/names[]/", "string");
        first.required = true;
        let mut title = row("TITLE", "title", "/", "string");
        title.required = true;
        let v = version(vec![title, first, row("TAGS", "tags[]", "/", "string")]);

        let schema = main_schema(&config, &v, SchemaUse::Read);
        assert_eq!(
            schema.required.iter().cloned().collect::<Vec<_>>(),
            vec!["id", "title"]
        );
        let names = &schema.properties["names"];
        assert!(names.is_type("array"));
        let items = names.items.as_ref().unwrap();
        assert!(items.properties.contains_key("firstName"));
        assert!(items.required.contains("firstName"));
        assert!(schema.properties["tags"].is_type("array"));

        let put = main_schema(&config, &v, SchemaUse::Put);
        assert!(!put.required.contains("id"));
    }

    #[test]
    fn main_schema_skips_inquiry_and_predefined_rows() {
        let config = ApiConfiguration::default();
        let mut key = row("KEY", "code", "/", "string");
        key.usage = "K".into();
        let mut v = version(vec![
            key,
            row("INQ", "computed", "/", "string"),
            row("MODE", "mode", "/predefinedInputs/", "string"),
        ]);
        v.inquiry_fields = vec!["KEY".into(), "INQ".into()];

        let post = main_schema(&config, &v, SchemaUse::Post);
        assert!(post.properties.contains_key("code"));
        assert!(!post.properties.contains_key("computed"));
        assert!(post.properties.contains_key("predefinedInputs"));

        let put = main_schema(&config, &v, SchemaUse::Put);
        assert!(!put.properties.contains_key("code"));

        let read = main_schema(&config, &v, SchemaUse::Read);
        assert!(read.properties.contains_key("computed"));
        assert!(!read.properties.contains_key("predefinedInputs"));
    }

    #[test]
    fn business_process_ids() {
        let mut config = ApiConfiguration {
            api_type: "T".into(),
            colleague_key_names: vec!["A.ID".into()],
            colleague_file_names: vec!["FILE".into()],
            ..Default::default()
        };
        let mut key = row("A.ID", "aId", "/", "string");
        key.conversion = "MD0".into();
        let v = version(vec![key, row("B.ID", "bId", "/", "string")]);

        let single = main_schema(&config, &v, SchemaUse::Read);
        let id = &single.properties["id"];
        assert_eq!(id.description.as_deref(), Some("The identifier for the resource"));
        assert_eq!(id.format.as_deref(), Some("MD0"));
        assert!(single.properties.contains_key("aId"));

        config.colleague_key_names.push("B.ID".into());
        let composite = main_schema(&config, &v, SchemaUse::Read);
        let id = &composite.properties["id"];
        assert_eq!(id.title.as_deref(), Some("ID"));
        assert!(id.properties.contains_key("aId"));
        assert!(id.properties.contains_key("bId"));
        assert!(!composite.properties.contains_key("aId"));

        let ids = id_schema(&config, &v);
        assert_eq!(ids.required.len(), 2);
    }

    #[test]
    fn filter_schema_respects_query_names() {
        let config = ApiConfiguration {
            api_type: "ethos".into(),
            ..Default::default()
        };
        let mut code = row("CODE", "code", "/", "string");
        code.filter_names = vec!["criteria".into()];
        let mut first = row("FIRST", "firstName", "/names[]/", "string");
        first.filter_names = vec!["personFilter".into()];
        let mut v = version(vec![code.clone(), first.clone()]);
        v.extended_data_filter_list = vec![FilterRow::from(&code), FilterRow::from(&first)];

        let criteria = filter_schema(&config, &v, "criteria");
        assert!(criteria.properties.contains_key("code"));
        assert!(!criteria.properties.contains_key("names"));

        let all = filter_schema(&config, &v, "");
        let names = &all.properties["names"];
        assert!(names.items.as_ref().unwrap().properties.contains_key("firstName"));

        let list = version(vec![ExtensibleDataRow::new("", "", STRING_LIST_TITLE, "/", "string", None)]);
        assert!(filter_schema(&config, &list, "criteria").is_type("string"));
    }

    #[test]
    fn named_query_schema_from_filter_rows() {
        let mut query = FilterRow::from(&row("", "keywordSearch", "/", "string"));
        query.named_query = true;
        query.description = "Search".into();
        let v = ExtensibleData {
            extended_data_filter_list: vec![query],
            ..Default::default()
        };
        let schema = named_query_schema(&v);
        let keyword = &schema.properties["keywordSearch"];
        assert_eq!(keyword.description.as_deref(), Some("Search"));
    }
}
