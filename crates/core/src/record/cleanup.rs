//! Removal of empty values from editor output.

use serde_json::Value;

/// Returns a copy of `value` without empty members, or `None` if nothing is left.
///
/// Nulls, empty strings, empty arrays and empty objects are empty. Arrays and
/// objects are cleaned recursively, so a container holding only empty members
/// is itself empty. `false` and `0` are kept.
#[must_use]
pub fn remove_empty_values(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let cleaned: Vec<Value> = items.iter().filter_map(remove_empty_values).collect();
            (!cleaned.is_empty()).then_some(Value::Array(cleaned))
        }
        Value::Object(map) => {
            let cleaned: serde_json::Map<String, Value> = map
                .iter()
                .filter_map(|(k, v)| remove_empty_values(v).map(|v| (k.clone(), v)))
                .collect();
            (!cleaned.is_empty()).then_some(Value::Object(cleaned))
        }
        other => Some(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_are_kept() {
        assert_eq!(remove_empty_values(&json!(0)), Some(json!(0)));
        assert_eq!(remove_empty_values(&json!(false)), Some(json!(false)));
        assert_eq!(remove_empty_values(&json!("a")), Some(json!("a")));
    }

    #[test]
    fn test_empty_values_are_removed() {
        assert_eq!(remove_empty_values(&json!(null)), None);
        assert_eq!(remove_empty_values(&json!("")), None);
        assert_eq!(remove_empty_values(&json!([])), None);
        assert_eq!(remove_empty_values(&json!({})), None);
    }

    #[test]
    fn test_nested_files_collection() {
        let files = json!([
            { "key": "a.pdf", "label": "", "tags": [], "extra": { "note": null } },
            { "key": "b.pdf", "label": "Cover", "order": 0 },
            { "label": "" }
        ]);

        assert_eq!(
            remove_empty_values(&files),
            Some(json!([
                { "key": "a.pdf" },
                { "key": "b.pdf", "label": "Cover", "order": 0 }
            ]))
        );
    }
}
