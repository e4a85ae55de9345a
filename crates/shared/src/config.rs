//! Application configuration management.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Global file handling configuration.
    #[serde(default)]
    pub files: FilesSettings,
    /// Per resource type file configuration, keyed by record type.
    #[serde(default)]
    pub resources: HashMap<String, ResourceSettings>,
    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Storage provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// In-process memory storage (tests, demos).
    #[default]
    Memory,
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create Azure Blob Storage provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Get the bucket/container name, reported as the `bucket` of every file entry.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::Memory => "memory",
            Self::S3 { bucket, .. } => bucket,
            Self::AzureBlob { container, .. } => container,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
        }
    }
}

/// Storage section of the configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Provider backing the file store.
    #[serde(default)]
    pub provider: StorageProvider,
    /// Base URL under which file downloads are served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_public_base_url() -> String {
    "/api/records".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Global file handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesSettings {
    /// Maximum upload size in megabytes (1 MB = 1000 × 1000 bytes).
    #[serde(default = "default_max_file_size_mb")]
    pub default_max_file_size_mb: u64,
}

fn default_max_file_size_mb() -> u64 {
    500
}

impl Default for FilesSettings {
    fn default() -> Self {
        Self {
            default_max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

/// File configuration for one resource type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceSettings {
    /// Extra metadata fields hidden from the file information panel.
    #[serde(default)]
    pub info_excluded_fields: Vec<String>,
    /// Maximum upload size in megabytes, overriding the global default.
    #[serde(default)]
    pub max_file_size_mb: Option<u64>,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Fallback filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON formatted events instead of plain text.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "folio=info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with_env(None)
    }

    /// Loads configuration with `env` standing in for the process environment.
    fn load_with_env(
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let run_mode = env
            .as_ref()
            .and_then(|vars| vars.get("RUN_MODE").cloned())
            .or_else(|| std::env::var("RUN_MODE").ok())
            .unwrap_or_else(|| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or does not match the schema.
    pub fn from_toml(document: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert!(matches!(config.storage.provider, StorageProvider::Memory));
        assert_eq!(config.storage.public_base_url, "/api/records");
        assert_eq!(config.files.default_max_file_size_mb, 500);
        assert!(config.resources.is_empty());
        assert_eq!(config.telemetry.filter, "folio=info");
        assert!(!config.telemetry.json);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[storage]
public_base_url = "https://example.org/api"

[storage.provider]
type = "local_fs"
root = "/var/lib/folio"

[files]
default_max_file_size_mb = 100

[resources.documents]
info_excluded_fields = ["label", "type"]
max_file_size_mb = 20

[telemetry]
filter = "folio=debug"
json = true
"#;

        let config = AppConfig::from_toml(toml).unwrap();

        assert_eq!(config.storage.public_base_url, "https://example.org/api");
        assert_eq!(config.storage.provider.name(), "local");
        assert_eq!(config.storage.provider.bucket(), "/var/lib/folio");
        assert_eq!(config.files.default_max_file_size_mb, 100);

        let documents = &config.resources["documents"];
        assert_eq!(documents.info_excluded_fields, vec!["label", "type"]);
        assert_eq!(documents.max_file_size_mb, Some(20));

        assert_eq!(config.telemetry.filter, "folio=debug");
        assert!(config.telemetry.json);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = AppConfig::from_toml("").unwrap();

        assert!(matches!(config.storage.provider, StorageProvider::Memory));
        assert_eq!(config.files.default_max_file_size_mb, 500);
    }

    #[test]
    fn test_parse_invalid_config() {
        assert!(AppConfig::from_toml("this is not valid toml [[[").is_err());
    }

    #[test]
    fn test_env_override() {
        let env = config::Map::from([
            ("FOLIO__FILES__DEFAULT_MAX_FILE_SIZE_MB".to_string(), "42".to_string()),
            ("FOLIO__TELEMETRY__JSON".to_string(), "true".to_string()),
        ]);

        let config = AppConfig::load_with_env(Some(env)).unwrap();

        assert_eq!(config.files.default_max_file_size_mb, 42);
        assert!(config.telemetry.json);
    }

    #[rstest]
    #[case(StorageProvider::Memory, "memory", "memory")]
    #[case(
        StorageProvider::s3("https://r2.example.com", "files", "key", "secret", "auto"),
        "s3",
        "files"
    )]
    #[case(
        StorageProvider::azure_blob("folio", "key", "attachments"),
        "azure_blob",
        "attachments"
    )]
    #[case(StorageProvider::local_fs("./storage"), "local", "./storage")]
    fn test_storage_provider_names(
        #[case] provider: StorageProvider,
        #[case] name: &str,
        #[case] bucket: &str,
    ) {
        assert_eq!(provider.name(), name);
        assert_eq!(provider.bucket(), bucket);
    }

    #[test]
    fn test_storage_provider_deserializes_tagged() {
        let provider: StorageProvider = serde_json::from_value(serde_json::json!({
            "type": "azure_blob",
            "account": "folio",
            "access_key": "key",
            "container": "attachments",
        }))
        .unwrap();
        assert_eq!(provider.name(), "azure_blob");
    }
}
