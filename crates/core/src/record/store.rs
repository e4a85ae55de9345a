//! Record store collaborator.

use std::future::Future;

use folio_shared::{RecordRef, RecordType};
use serde_json::Value;

use super::error::RecordError;
use super::types::Record;

/// Remote record API.
///
/// This trait is implemented by the composing application on top of its record transport.
pub trait RecordStore: Send + Sync {
    /// Fetch a record document.
    fn get(&self, record: &RecordRef) -> impl Future<Output = Result<Record, RecordError>> + Send;

    /// Replace a record document, returning the stored version.
    fn update(
        &self,
        record: &RecordRef,
        document: Record,
    ) -> impl Future<Output = Result<Record, RecordError>> + Send;

    /// Fetch the JSON schema of a resource type.
    fn schema(
        &self,
        record_type: &RecordType,
    ) -> impl Future<Output = Result<Value, RecordError>> + Send;
}
