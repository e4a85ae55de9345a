//! Metadata form fields derived from a record type's JSON schema.
//!
//! Per-file metadata is described by the `properties._files.items` member of
//! the record schema. Property order follows the schema's `propertiesOrder`
//! list; properties it does not mention keep their declaration order after the
//! listed ones.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::RecordError;

/// Descriptor of one editable metadata field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Property name in the metadata object.
    pub name: String,
    /// Human readable label (schema `title`, falling back to the name).
    pub label: String,
    /// JSON type declared by the schema, if any.
    pub field_type: Option<String>,
    /// Whether the field must be filled.
    pub required: bool,
    /// Dynamic expressions passed through from the schema `form.expressions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expressions: Option<Value>,
    /// Nested fields for object properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormField>,
}

/// Returns the schema describing one `_files` item, if the record type has per-file metadata.
#[must_use]
pub fn files_item_schema(schema: &Value) -> Option<&Value> {
    schema.pointer("/properties/_files/items")
}

/// Builds the metadata form for a record schema.
///
/// Returns `Ok(None)` when the record type has no per-file metadata.
pub fn file_form_fields(schema: &Value) -> Result<Option<Vec<FormField>>, RecordError> {
    files_item_schema(schema).map(object_fields).transpose()
}

/// Builds the ordered field list of an object schema.
pub fn object_fields(schema: &Value) -> Result<Vec<FormField>, RecordError> {
    let properties = match schema.get("properties") {
        None => return Ok(Vec::new()),
        Some(Value::Object(properties)) => properties,
        Some(_) => {
            return Err(RecordError::InvalidSchema(
                "`properties` must be an object".to_string(),
            ));
        }
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    ordered_names(schema, properties)
        .into_iter()
        .map(|name| {
            let property = &properties[name];
            Ok(FormField {
                name: name.to_string(),
                label: property
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or(name)
                    .to_string(),
                field_type: property
                    .get("type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                required: required.contains(&name),
                expressions: property.pointer("/form/expressions").cloned(),
                fields: if property.get("type").and_then(Value::as_str) == Some("object") {
                    object_fields(property)?
                } else {
                    Vec::new()
                },
            })
        })
        .collect()
}

fn ordered_names<'a>(schema: &'a Value, properties: &'a Map<String, Value>) -> Vec<&'a str> {
    let mut names: Vec<&str> = schema
        .get("propertiesOrder")
        .and_then(Value::as_array)
        .map(|order| {
            order
                .iter()
                .filter_map(Value::as_str)
                .filter(|name| properties.contains_key(*name))
                .collect()
        })
        .unwrap_or_default();

    for name in properties.keys() {
        if !names.contains(&name.as_str()) {
            names.push(name.as_str());
        }
    }
    names
}

/// Validates a metadata model against the form fields.
///
/// Returns one message per failing field; an empty list means the model is valid.
#[must_use]
pub fn validate(fields: &[FormField], model: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();
    validate_into(fields, model, "", &mut errors);
    errors
}

fn validate_into(
    fields: &[FormField],
    model: &Map<String, Value>,
    prefix: &str,
    errors: &mut Vec<String>,
) {
    for field in fields {
        let path = format!("{prefix}{}", field.name);
        match model.get(&field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    errors.push(format!("{path} is required"));
                }
            }
            Some(Value::String(s)) if s.is_empty() && field.required => {
                errors.push(format!("{path} is required"));
            }
            Some(value) => {
                if let Some(expected) = field.field_type.as_deref() {
                    if !matches_type(value, expected) {
                        errors.push(format!("{path} must be of type {expected}"));
                        continue;
                    }
                }
                if let Value::Object(nested) = value {
                    validate_into(&field.fields, nested, &format!("{path}."), errors);
                }
            }
        }
    }
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "_files": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "propertiesOrder": ["label", "order"],
                        "required": ["key", "label"],
                        "properties": {
                            "key": { "type": "string", "title": "Key" },
                            "order": { "type": "integer", "title": "Order" },
                            "label": {
                                "type": "string",
                                "title": "Label",
                                "form": { "expressions": { "hide": "!model.key" } }
                            },
                            "rights": {
                                "type": "object",
                                "required": ["holder"],
                                "properties": { "holder": { "type": "string" } }
                            }
                        }
                    }
                }
            }
        })
    }

    fn model(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_schema_without_files() {
        let schema = json!({ "properties": { "title": { "type": "string" } } });
        assert_eq!(file_form_fields(&schema).unwrap(), None);
    }

    #[test]
    fn test_fields_follow_properties_order() {
        let fields = file_form_fields(&document_schema()).unwrap().unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["label", "order", "key", "rights"]);
    }

    #[test]
    fn test_field_descriptor_details() {
        let fields = file_form_fields(&document_schema()).unwrap().unwrap();

        let label = &fields[0];
        assert_eq!(label.label, "Label");
        assert_eq!(label.field_type.as_deref(), Some("string"));
        assert!(label.required);
        assert_eq!(label.expressions, Some(json!({ "hide": "!model.key" })));

        let rights = &fields[3];
        assert_eq!(rights.label, "rights");
        assert!(!rights.required);
        assert_eq!(rights.fields.len(), 1);
        assert!(rights.fields[0].required);
    }

    #[test]
    fn test_invalid_properties() {
        let schema = json!({ "properties": { "_files": { "items": { "properties": [] } } } });
        assert!(matches!(
            file_form_fields(&schema),
            Err(RecordError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_validate_valid_model() {
        let fields = file_form_fields(&document_schema()).unwrap().unwrap();
        let errors = validate(
            &fields,
            &model(json!({ "key": "a.pdf", "label": "Cover", "order": 1 })),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_reports_each_failure() {
        let fields = file_form_fields(&document_schema()).unwrap().unwrap();
        let errors = validate(
            &fields,
            &model(json!({
                "key": "a.pdf",
                "label": "",
                "order": "first",
                "rights": {}
            })),
        );

        assert_eq!(
            errors,
            vec![
                "label is required".to_string(),
                "order must be of type integer".to_string(),
                "rights.holder is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_validate_without_fields() {
        assert!(validate(&[], &model(json!({ "anything": 1 }))).is_empty());
    }
}
