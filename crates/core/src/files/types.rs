//! File attachment types and data structures.

use std::path::Path;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::FilesError;
use crate::record::FormField;

/// One version of a file attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File key, unique within a version chain.
    pub key: String,
    /// Version identifier.
    pub version_id: String,
    /// Whether this is the current version of the key.
    pub is_head: bool,
    /// Size in bytes.
    pub size: u64,
    /// Content checksum (`algorithm:hex`).
    pub checksum: String,
    /// Storage bucket holding the blob.
    pub bucket: String,
    /// Storage level file identifier.
    pub file_id: String,
    /// Metadata stored in the parent record's `_files`.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    /// Whether the information panel is shown.
    #[serde(default)]
    pub show_info: bool,
    /// Whether older versions of the key are shown.
    #[serde(default)]
    pub show_children: bool,
    /// Download URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// Outcome of an eligibility check such as "can a file be added".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionStatus {
    /// Whether the action is allowed.
    pub can: bool,
    /// Explanation shown when the action is refused.
    #[serde(default)]
    pub message: String,
}

impl ActionStatus {
    /// The action is allowed.
    #[must_use]
    pub fn allowed() -> Self {
        Self {
            can: true,
            message: String::new(),
        }
    }

    /// The action is refused with the given explanation.
    #[must_use]
    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            can: false,
            message: message.into(),
        }
    }
}

/// State of the upload form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadForm {
    /// Entry being replaced; `None` when adding a new file.
    pub current: Option<FileEntry>,
}

/// State of an open metadata editor.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataForm {
    /// Key of the file being edited.
    pub key: String,
    /// Editable model, loaded from the file's metadata.
    pub model: Map<String, Value>,
    /// Field descriptors built from the record schema.
    pub fields: Vec<FormField>,
}

/// Read-only view published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilesSnapshot {
    /// Current file list, head entries and older versions.
    pub files: Vec<FileEntry>,
    /// Whether new files may be added.
    pub can_add: ActionStatus,
    /// Whether the last refresh failed.
    pub has_error: bool,
    /// Whether a refresh is in progress.
    pub loading: bool,
    /// Open upload form, if any.
    pub upload_form: Option<UploadForm>,
    /// Open metadata editor, if any.
    pub metadata_form: Option<MetadataForm>,
}

/// A file selected for upload.
pub struct FileUpload {
    /// Original file name.
    pub name: String,
    /// Declared size in bytes.
    pub size: u64,
    reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl FileUpload {
    /// Create an upload reading from any async source.
    pub fn new(
        name: impl Into<String>,
        size: u64,
        reader: impl AsyncRead + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            reader: Box::pin(reader),
        }
    }

    /// Create an upload from in-memory content.
    pub fn from_bytes(name: impl Into<String>, content: Vec<u8>) -> Self {
        let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
        Self::new(name, size, std::io::Cursor::new(content))
    }

    /// Open a file on disk for upload, named after its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or has no file name.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
            })?
            .to_string();
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        Ok(Self::new(name, size, file))
    }

    /// Reads the whole content, refusing more than `limit` bytes.
    pub(crate) async fn read_all(self, limit: u64) -> Result<Vec<u8>, FilesError> {
        let Self { name, size, reader } = self;
        let mut content = Vec::with_capacity(usize::try_from(size.min(limit)).unwrap_or(0));

        reader
            .take(limit.saturating_add(1))
            .read_to_end(&mut content)
            .await
            .map_err(|source| FilesError::Read {
                name: name.clone(),
                source,
            })?;

        let read = u64::try_from(content.len()).unwrap_or(u64::MAX);
        if read > limit {
            return Err(FilesError::size_limit_exceeded(name, read, limit));
        }
        Ok(content)
    }
}
