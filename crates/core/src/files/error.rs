//! File coordination error types.

use thiserror::Error;

use crate::record::RecordError;
use crate::storage::StorageError;

/// Bytes per megabyte, as used in upload size limits.
pub const BYTES_PER_MB: u64 = 1000 * 1000;

/// File coordination errors.
#[derive(Debug, Error)]
pub enum FilesError {
    /// Upload exceeds the maximum size for the resource type.
    #[error("The maximum size for a file is {}Mb, {name} cannot be uploaded.", .max / BYTES_PER_MB)]
    SizeLimitExceeded {
        /// Offending file name.
        name: String,
        /// Size of the upload in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        max: u64,
    },

    /// Metadata model failed schema validation.
    #[error("The form contains errors.")]
    Validation(Vec<String>),

    /// Upload content could not be read.
    #[error("cannot read {name}: {source}")]
    Read {
        /// File name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Record store failure.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// File store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// An operation was given an empty file key.
    #[error("file key must not be empty")]
    EmptyKey,

    /// No configuration is registered for the resource type.
    #[error("no file configuration for resource type: {0}")]
    UnknownResource(String),

    /// No metadata form is open.
    #[error("no metadata form is open")]
    NoActiveForm,

    /// The coordinator has been disposed.
    #[error("file coordinator has been disposed")]
    Disposed,
}

impl FilesError {
    /// Create a size limit error.
    #[must_use]
    pub fn size_limit_exceeded(name: impl Into<String>, size: u64, max: u64) -> Self {
        Self::SizeLimitExceeded {
            name: name.into(),
            size,
            max,
        }
    }
}
