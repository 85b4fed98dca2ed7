//! Output field schema inference from sample values.
//!
//! Nested keys are joined with `__`; a segment holding an array of objects
//! gets a `[]` suffix:
//!
//! ```text
//! {"e": {"f": "y"}, "items": [{"name": "a"}]}  ->  e__f, items[]__name
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator between nested key segments.
pub const PATH_SEPARATOR: &str = "__";

/// Suffix marking a segment that holds an array of objects.
pub const ARRAY_SUFFIX: &str = "[]";

/// Object array elements inspected when merging keys.
const SAMPLED_ELEMENTS: usize = 10;

/// Inferred type of an output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Datetime,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Datetime => "datetime",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub key: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub list: bool,
}

impl FieldSchema {
    fn new(key: String, field_type: Option<FieldType>, list: bool) -> Self {
        Self {
            key,
            field_type,
            list,
        }
    }
}

/// Derive the output fields of a sample value.
///
/// Objects are walked recursively. A top-level array is treated like a
/// nested array of objects without a prefix. Scalars at the top level have
/// no fields.
pub fn infer_fields(sample: &Value) -> Vec<FieldSchema> {
    let mut fields = Vec::new();
    match sample {
        Value::Object(map) => collect_object(map, None, &mut fields),
        Value::Array(items) => collect_object_array(items, None, &mut fields),
        _ => {}
    }
    fields
}

fn collect_object(map: &Map<String, Value>, prefix: Option<&str>, out: &mut Vec<FieldSchema>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, PATH_SEPARATOR, key),
            None => key.clone(),
        };
        collect_value(value, path, out);
    }
}

fn collect_value(value: &Value, path: String, out: &mut Vec<FieldSchema>) {
    match value {
        Value::Object(map) if !map.is_empty() => collect_object(map, Some(&path), out),
        Value::Array(items) => match items.first() {
            Some(Value::Object(_)) => {
                let prefix = format!("{}{}", path, ARRAY_SUFFIX);
                collect_object_array(items, Some(&prefix), out);
            }
            Some(first) => push_field(out, FieldSchema::new(path, scalar_type(first), true)),
            None => push_field(out, FieldSchema::new(path, None, false)),
        },
        other => push_field(out, FieldSchema::new(path, scalar_type(other), false)),
    }
}

fn collect_object_array(items: &[Value], prefix: Option<&str>, out: &mut Vec<FieldSchema>) {
    for item in items.iter().take(SAMPLED_ELEMENTS) {
        if let Value::Object(map) = item {
            collect_object(map, prefix, out);
        }
    }
}

/// Add a field, keeping the first occurrence of a key. A later occurrence
/// only fills in a type the first one lacked.
fn push_field(out: &mut Vec<FieldSchema>, field: FieldSchema) {
    match out.iter_mut().find(|existing| existing.key == field.key) {
        Some(existing) => {
            if existing.field_type.is_none() && field.field_type.is_some() {
                existing.field_type = field.field_type;
                existing.list = field.list;
            }
        }
        None => out.push(field),
    }
}

fn scalar_type(value: &Value) -> Option<FieldType> {
    match value {
        Value::String(s) if is_datetime(s) => Some(FieldType::Datetime),
        Value::String(_) => Some(FieldType::String),
        Value::Number(_) => Some(FieldType::Number),
        Value::Bool(_) => Some(FieldType::Boolean),
        _ => None,
    }
}

fn is_datetime(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
