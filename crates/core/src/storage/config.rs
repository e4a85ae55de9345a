//! Storage configuration types.

use folio_shared::config::StorageSettings;

pub use folio_shared::config::StorageProvider;

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Base URL under which file downloads are served.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Default base URL for download links.
    pub const DEFAULT_PUBLIC_BASE_URL: &'static str = "/api/records";

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            public_base_url: Self::DEFAULT_PUBLIC_BASE_URL.to_string(),
        }
    }

    /// Set the base URL for download links.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into();
        self
    }
}

impl From<&StorageSettings> for StorageConfig {
    fn from(settings: &StorageSettings) -> Self {
        Self::new(settings.provider.clone()).with_public_base_url(&settings.public_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::new(StorageProvider::Memory);
        assert_eq!(config.public_base_url, "/api/records");
        assert_eq!(config.provider.name(), "memory");
    }

    #[test]
    fn test_storage_config_from_settings() {
        let settings = StorageSettings {
            provider: StorageProvider::local_fs("./storage"),
            public_base_url: "https://files.example.org/records".to_string(),
        };

        let config = StorageConfig::from(&settings);

        assert_eq!(config.provider.name(), "local");
        assert_eq!(config.public_base_url, "https://files.example.org/records");
    }
}
