//! Record document types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::cleanup::remove_empty_values;

/// Name of the record metadata member holding per-file metadata.
pub const FILES_FIELD: &str = "_files";

/// A record document as returned by the record API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Record PID.
    pub id: String,
    /// Record metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Record {
    /// Create a record with the given PID and metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            metadata,
        }
    }

    /// The `_files` collection, if the record has one.
    #[must_use]
    pub fn files_metadata(&self) -> Option<&Vec<Value>> {
        self.metadata.get(FILES_FIELD).and_then(Value::as_array)
    }

    /// Metadata stored in the record for the file with the given key.
    ///
    /// Returns the first `_files` object whose `key` matches.
    #[must_use]
    pub fn file_metadata(&self, key: &str) -> Option<Map<String, Value>> {
        self.files_metadata()?
            .iter()
            .filter_map(Value::as_object)
            .find(|item| item.get("key").and_then(Value::as_str) == Some(key))
            .cloned()
    }

    /// Replaces the `_files` object for `key` with `model`, appending it if absent.
    ///
    /// The `key` member of the stored object is always `key`.
    pub fn set_file_metadata(&mut self, key: &str, mut model: Map<String, Value>) {
        model.insert("key".to_string(), Value::String(key.to_string()));

        let files = self
            .metadata
            .entry(FILES_FIELD)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !files.is_array() {
            *files = Value::Array(Vec::new());
        }
        let Value::Array(items) = files else {
            return;
        };

        let position = items
            .iter()
            .position(|item| item.get("key").and_then(Value::as_str) == Some(key));
        match position {
            Some(index) => items[index] = Value::Object(model),
            None => items.push(Value::Object(model)),
        }
    }

    /// Strips empty values from the `_files` collection, removing it when nothing is left.
    pub fn clean_files_metadata(&mut self) {
        let Some(files) = self.metadata.get(FILES_FIELD) else {
            return;
        };
        match remove_empty_values(files) {
            Some(cleaned) => {
                self.metadata.insert(FILES_FIELD.to_string(), cleaned);
            }
            None => {
                self.metadata.remove(FILES_FIELD);
            }
        }
    }
}
