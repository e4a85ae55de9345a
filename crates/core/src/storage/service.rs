//! Storage service implementation using Apache OpenDAL.

use std::collections::BTreeMap;

use folio_shared::RecordRef;
use opendal::{ErrorKind, Operator, services};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::store::FileStore;
use crate::files::FileEntry;

/// Suffix of the descriptor written next to every version blob.
const INFO_SUFFIX: &str = ".info.json";

/// Size and digest of a version, recorded once when it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BlobInfo {
    size: u64,
    checksum: String,
}

impl BlobInfo {
    fn of(content: &[u8]) -> Self {
        Self {
            size: u64::try_from(content.len()).unwrap_or(u64::MAX),
            checksum: checksum(content),
        }
    }
}

/// Versioned file store backed by an OpenDAL operator.
///
/// Each version lives at `{type}/{pid}/{key}/{version_id}` with a small JSON
/// descriptor beside it, so listing never reads file content.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("provider", &self.config.provider.name())
            .field("bucket", &self.bucket())
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };
        Ok(operator)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    fn file_entry(
        &self,
        record: &RecordRef,
        key: &str,
        version_id: &str,
        is_head: bool,
        info: BlobInfo,
    ) -> FileEntry {
        let path = blob_path(record, key, version_id);
        FileEntry {
            key: key.to_string(),
            version_id: version_id.to_string(),
            is_head,
            size: info.size,
            checksum: info.checksum,
            bucket: self.bucket().to_string(),
            file_id: Uuid::new_v5(&Uuid::NAMESPACE_URL, path.as_bytes()).to_string(),
            metadata: None,
            show_info: false,
            show_children: false,
            url: None,
        }
    }

    /// Reads the descriptor of a version.
    ///
    /// Blobs written without one report their stat size and an empty checksum.
    async fn blob_info(&self, path: &str) -> Result<BlobInfo, StorageError> {
        match self.operator.read(&info_path(path)).await {
            Ok(buffer) => serde_json::from_slice(&buffer.to_vec())
                .map_err(|e| StorageError::operation(format!("invalid descriptor for {path}: {e}"))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let meta = self.operator.stat(path).await?;
                Ok(BlobInfo {
                    size: meta.content_length(),
                    checksum: String::new(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl FileStore for StorageService {
    async fn list(&self, record: &RecordRef) -> Result<Vec<FileEntry>, StorageError> {
        let prefix = record_prefix(record)?;
        let entries = match self.operator.list_with(&prefix).recursive(true).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in entries {
            if !entry.metadata().mode().is_file() {
                continue;
            }
            let Some((key, version_id)) = entry
                .path()
                .strip_prefix(&prefix)
                .and_then(|rest| rest.split_once('/'))
            else {
                continue;
            };
            if key.is_empty()
                || version_id.is_empty()
                || version_id.contains('/')
                || version_id.ends_with(INFO_SUFFIX)
            {
                continue;
            }
            versions
                .entry(key.to_string())
                .or_default()
                .push(version_id.to_string());
        }

        let mut files = Vec::new();
        for (key, mut ids) in versions {
            ids.sort_unstable_by(|a, b| b.cmp(a));
            for (index, version_id) in ids.iter().enumerate() {
                let info = self.blob_info(&blob_path(record, &key, version_id)).await?;
                files.push(self.file_entry(record, &key, version_id, index == 0, info));
            }
        }

        debug!(record = %record, count = files.len(), "listed files");
        Ok(files)
    }

    async fn put(
        &self,
        record: &RecordRef,
        key: &str,
        content: Vec<u8>,
    ) -> Result<FileEntry, StorageError> {
        validate_segment(key)?;
        record_prefix(record)?;

        let version_id = Uuid::now_v7().to_string();
        let info = BlobInfo::of(&content);
        let descriptor =
            serde_json::to_vec(&info).map_err(|e| StorageError::operation(e.to_string()))?;
        let entry = self.file_entry(record, key, &version_id, true, info);

        let path = blob_path(record, key, &version_id);
        self.operator.write(&path, content).await?;
        self.operator.write(&info_path(&path), descriptor).await?;

        debug!(record = %record, key, version_id, size = entry.size, "stored file version");
        Ok(entry)
    }

    async fn delete(
        &self,
        record: &RecordRef,
        key: &str,
        version_id: &str,
    ) -> Result<(), StorageError> {
        validate_segment(key)?;
        validate_segment(version_id)?;
        record_prefix(record)?;

        let path = blob_path(record, key, version_id);
        match self.operator.stat(&path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(path));
            }
            Err(e) => return Err(e.into()),
        }
        self.operator.delete(&path).await?;
        self.operator.delete(&info_path(&path)).await?;

        debug!(record = %record, key, version_id, "deleted file version");
        Ok(())
    }

    fn url_for(&self, record: &RecordRef, key: &str) -> String {
        format!(
            "{}/{}/{}/files/{}",
            self.config.public_base_url.trim_end_matches('/'),
            record.record_type,
            record.pid,
            urlencoding::encode(key)
        )
    }
}

/// `{type}/{pid}/`, rejecting identifiers that would escape their segment.
fn record_prefix(record: &RecordRef) -> Result<String, StorageError> {
    validate_segment(record.record_type.as_str())?;
    validate_segment(record.pid.as_str())?;
    Ok(format!("{}/{}/", record.record_type, record.pid))
}

fn blob_path(record: &RecordRef, key: &str, version_id: &str) -> String {
    format!("{}/{}/{key}/{version_id}", record.record_type, record.pid)
}

fn info_path(blob_path: &str) -> String {
    format!("{blob_path}{INFO_SUFFIX}")
}

fn validate_segment(segment: &str) -> Result<(), StorageError> {
    if segment.is_empty() || segment == "." || segment == ".." || segment.contains('/') {
        return Err(StorageError::invalid_key(segment));
    }
    Ok(())
}

fn checksum(content: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(content))
}
