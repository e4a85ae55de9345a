//! Record store error types.

use thiserror::Error;

/// Record store operation errors.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Record not found.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Schema not found for a resource type.
    #[error("schema not found for resource type: {0}")]
    SchemaNotFound(String),

    /// Schema does not have the expected shape.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Remote record API failed.
    #[error("record API error: {0}")]
    Remote(String),
}

impl RecordError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(record: impl std::fmt::Display) -> Self {
        Self::NotFound(record.to_string())
    }

    /// Create a remote failure error.
    #[must_use]
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }
}
