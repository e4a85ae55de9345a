//! File attachment coordination.
//!
//! A [`FileCoordinator`] keeps the authoritative list of the files attached to
//! one record. The list combines the versions returned by a [`FileStore`] with
//! the per-file metadata stored in the record's `_files` collection, filtered
//! and ordered by the [`ResourceConfig`] of the record type.
//!
//! [`FileStore`]: crate::storage::FileStore

mod config;
mod coordinator;
mod error;
mod types;
pub mod visibility;

#[cfg(test)]
mod props;

pub use config::{
    DEFAULT_INFO_EXCLUDED_FIELDS, DEFAULT_MAX_FILE_SIZE_MB, DefaultHooks, FilesHooks, HookSet,
    ResourceConfig, ResourceRegistry, StaticRegistry,
};
pub use coordinator::{
    CONFIRM_DELETE, CONFIRM_TITLE, Collaborators, DELETE_SUCCESS, FORM_ERRORS, FileCoordinator,
    METADATA_SUCCESS, UPLOAD_SUCCESS,
};
pub use error::{BYTES_PER_MB, FilesError};
pub use types::{ActionStatus, FileEntry, FileUpload, FilesSnapshot, MetadataForm, UploadForm};
