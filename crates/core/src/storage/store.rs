//! File store abstraction.

use std::future::Future;

use folio_shared::RecordRef;

use super::error::StorageError;
use crate::files::FileEntry;

/// Versioned blob storage for the files attached to records.
///
/// Implementations return every stored version. For each key exactly one
/// entry is the head and entries sharing a key are listed head first.
pub trait FileStore: Send + Sync {
    /// Lists all versions of all files attached to a record.
    fn list(
        &self,
        record: &RecordRef,
    ) -> impl Future<Output = Result<Vec<FileEntry>, StorageError>> + Send;

    /// Stores a new version of `key`; the new version becomes the head.
    fn put(
        &self,
        record: &RecordRef,
        key: &str,
        content: Vec<u8>,
    ) -> impl Future<Output = Result<FileEntry, StorageError>> + Send;

    /// Removes one version of `key`.
    fn delete(
        &self,
        record: &RecordRef,
        key: &str,
        version_id: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Download URL for the head version of `key`.
    fn url_for(&self, record: &RecordRef, key: &str) -> String;
}
