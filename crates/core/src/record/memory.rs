//! In-process record store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use folio_shared::{RecordRef, RecordType};
use serde_json::Value;

use super::error::RecordError;
use super::store::RecordStore;
use super::types::Record;

/// Record store keeping documents and schemas in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<RecordRef, Record>>,
    schemas: Mutex<HashMap<RecordType, Value>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record document.
    pub fn insert(&self, record: RecordRef, document: Record) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record, document);
    }

    /// Insert or replace the schema of a resource type.
    pub fn insert_schema(&self, record_type: RecordType, schema: Value) {
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record_type, schema);
    }

    /// Current document for a record, if any.
    #[must_use]
    pub fn document(&self, record: &RecordRef) -> Option<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(record)
            .cloned()
    }
}

impl RecordStore for MemoryRecordStore {
    async fn get(&self, record: &RecordRef) -> Result<Record, RecordError> {
        self.document(record)
            .ok_or_else(|| RecordError::not_found(record))
    }

    async fn update(&self, record: &RecordRef, document: Record) -> Result<Record, RecordError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if !records.contains_key(record) {
            return Err(RecordError::not_found(record));
        }
        records.insert(record.clone(), document.clone());
        Ok(document)
    }

    async fn schema(&self, record_type: &RecordType) -> Result<Value, RecordError> {
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(record_type)
            .cloned()
            .ok_or_else(|| RecordError::SchemaNotFound(record_type.to_string()))
    }
}
