//! Per resource type file configuration.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use folio_shared::{AppConfig, RecordRef, RecordType};
use futures::stream::{self, BoxStream, StreamExt};

use super::error::BYTES_PER_MB;
use super::types::{ActionStatus, FileEntry};

/// Metadata fields never shown in the information panel.
pub const DEFAULT_INFO_EXCLUDED_FIELDS: [&str; 6] =
    ["key", "bucket", "checksum", "file_id", "size", "version_id"];

/// Upload size limit used when a resource type does not set one.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 500;

/// Behavioral hooks of a resource type.
///
/// Every hook has a default: keep all files, keep the store order, and refuse
/// new files.
pub trait FilesHooks: Send + Sync {
    /// Whether `file` is kept in the list.
    fn filter(&self, _file: &FileEntry) -> bool {
        true
    }

    /// Relative order of two files. Sorting is stable.
    fn order(&self, _a: &FileEntry, _b: &FileEntry) -> Ordering {
        Ordering::Equal
    }

    /// Stream of add eligibility for a record. The latest value wins.
    fn can_add(&self, _record: &RecordRef) -> BoxStream<'static, ActionStatus> {
        stream::once(futures::future::ready(ActionStatus::default())).boxed()
    }
}

/// Hooks with every default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl FilesHooks for DefaultHooks {}

type FilterFn = dyn Fn(&FileEntry) -> bool + Send + Sync;
type OrderFn = dyn Fn(&FileEntry, &FileEntry) -> Ordering + Send + Sync;
type CanAddFn = dyn Fn(&RecordRef) -> BoxStream<'static, ActionStatus> + Send + Sync;

/// Hooks assembled from closures; unset hooks keep their default.
#[derive(Clone, Default)]
pub struct HookSet {
    filter: Option<Arc<FilterFn>>,
    order: Option<Arc<OrderFn>>,
    can_add: Option<Arc<CanAddFn>>,
}

impl HookSet {
    /// Create a hook set with every default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter hook.
    #[must_use]
    pub fn with_filter(mut self, f: impl Fn(&FileEntry) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(f));
        self
    }

    /// Set the order hook.
    #[must_use]
    pub fn with_order(
        mut self,
        f: impl Fn(&FileEntry, &FileEntry) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.order = Some(Arc::new(f));
        self
    }

    /// Set the add eligibility hook.
    #[must_use]
    pub fn with_can_add(
        mut self,
        f: impl Fn(&RecordRef) -> BoxStream<'static, ActionStatus> + Send + Sync + 'static,
    ) -> Self {
        self.can_add = Some(Arc::new(f));
        self
    }
}

impl std::fmt::Debug for HookSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSet")
            .field("filter", &self.filter.is_some())
            .field("order", &self.order.is_some())
            .field("can_add", &self.can_add.is_some())
            .finish()
    }
}

impl FilesHooks for HookSet {
    fn filter(&self, file: &FileEntry) -> bool {
        self.filter.as_ref().is_none_or(|f| f(file))
    }

    fn order(&self, a: &FileEntry, b: &FileEntry) -> Ordering {
        self.order.as_ref().map_or(Ordering::Equal, |f| f(a, b))
    }

    fn can_add(&self, record: &RecordRef) -> BoxStream<'static, ActionStatus> {
        match &self.can_add {
            Some(f) => f(record),
            None => DefaultHooks.can_add(record),
        }
    }
}

/// File configuration of one resource type.
#[derive(Clone)]
pub struct ResourceConfig {
    /// Extra metadata fields hidden from the information panel.
    pub info_excluded_fields: Vec<String>,
    /// Upload size limit in megabytes; [`DEFAULT_MAX_FILE_SIZE_MB`] when unset.
    pub max_file_size_mb: Option<u64>,
    /// Filter, order and add eligibility hooks.
    pub hooks: Arc<dyn FilesHooks>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            info_excluded_fields: Vec::new(),
            max_file_size_mb: None,
            hooks: Arc::new(DefaultHooks),
        }
    }
}

impl std::fmt::Debug for ResourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceConfig")
            .field("info_excluded_fields", &self.info_excluded_fields)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .finish_non_exhaustive()
    }
}

impl ResourceConfig {
    /// Create a config with default hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide extra metadata fields from the information panel.
    #[must_use]
    pub fn with_info_excluded_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.info_excluded_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the upload size limit in megabytes.
    #[must_use]
    pub fn with_max_file_size_mb(mut self, mb: u64) -> Self {
        self.max_file_size_mb = Some(mb);
        self
    }

    /// Set the hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: impl FilesHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Upload size limit in bytes.
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size_mb
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB)
            .saturating_mul(BYTES_PER_MB)
    }

    /// Default excluded fields followed by the type specific ones, without duplicates.
    #[must_use]
    pub fn excluded_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = DEFAULT_INFO_EXCLUDED_FIELDS
            .iter()
            .map(|f| (*f).to_string())
            .collect();
        for field in &self.info_excluded_fields {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        fields
    }
}

/// Source of resource configurations.
pub trait ResourceRegistry: Send + Sync {
    /// Configuration for a record type, if registered.
    fn config_for(&self, record_type: &RecordType) -> Option<ResourceConfig>;
}

/// Registry backed by a map.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    configs: HashMap<RecordType, ResourceConfig>,
}

impl StaticRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the configuration of a record type, replacing any previous one.
    pub fn register(&mut self, record_type: impl Into<RecordType>, config: ResourceConfig) {
        self.configs.insert(record_type.into(), config);
    }

    /// Builder form of [`StaticRegistry::register`].
    #[must_use]
    pub fn with(mut self, record_type: impl Into<RecordType>, config: ResourceConfig) -> Self {
        self.register(record_type, config);
        self
    }

    /// Build a registry from the `resources` section, with default hooks.
    ///
    /// Types without their own limit get `files.default_max_file_size_mb`.
    #[must_use]
    pub fn from_settings(config: &AppConfig) -> Self {
        let configs = config
            .resources
            .iter()
            .map(|(name, settings)| {
                let resource = ResourceConfig {
                    info_excluded_fields: settings.info_excluded_fields.clone(),
                    max_file_size_mb: Some(
                        settings
                            .max_file_size_mb
                            .unwrap_or(config.files.default_max_file_size_mb),
                    ),
                    hooks: Arc::new(DefaultHooks),
                };
                (RecordType::new(name.as_str()), resource)
            })
            .collect();
        Self { configs }
    }
}

impl ResourceRegistry for StaticRegistry {
    fn config_for(&self, record_type: &RecordType) -> Option<ResourceConfig> {
        self.configs.get(record_type).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::visibility::fixtures::entry;
    use rstest::rstest;

    #[rstest]
    #[case(None, 500_000_000)]
    #[case(Some(10), 10_000_000)]
    #[case(Some(0), 0)]
    fn test_max_file_size(#[case] mb: Option<u64>, #[case] bytes: u64) {
        let config = ResourceConfig {
            max_file_size_mb: mb,
            ..ResourceConfig::default()
        };
        assert_eq!(config.max_file_size(), bytes);
    }

    #[test]
    fn test_excluded_fields_merge_without_duplicates() {
        let config = ResourceConfig::new().with_info_excluded_fields(["size", "internal_note"]);
        assert_eq!(
            config.excluded_fields(),
            vec!["key", "bucket", "checksum", "file_id", "size", "version_id", "internal_note"]
        );
    }

    #[tokio::test]
    async fn test_default_hooks() {
        let hooks = DefaultHooks;
        let a = entry("a.pdf", "v1", true);
        let b = entry("b.pdf", "v1", true);

        assert!(hooks.filter(&a));
        assert_eq!(hooks.order(&a, &b), Ordering::Equal);

        let statuses: Vec<ActionStatus> = hooks
            .can_add(&RecordRef::new("documents", "1"))
            .collect()
            .await;
        assert_eq!(statuses, vec![ActionStatus::denied("")]);
    }

    #[tokio::test]
    async fn test_hook_set_closures() {
        let hooks = HookSet::new()
            .with_filter(|f| f.key.ends_with(".pdf"))
            .with_order(|a, b| b.key.cmp(&a.key))
            .with_can_add(|_| stream::iter([ActionStatus::allowed()]).boxed());

        let a = entry("a.pdf", "v1", true);
        let b = entry("b.txt", "v1", true);

        assert!(hooks.filter(&a));
        assert!(!hooks.filter(&b));
        assert_eq!(hooks.order(&a, &b), Ordering::Greater);
        let statuses: Vec<ActionStatus> = hooks
            .can_add(&RecordRef::new("documents", "1"))
            .collect()
            .await;
        assert_eq!(statuses, vec![ActionStatus::allowed()]);
    }

    #[test]
    fn test_registry_from_settings() {
        let app = AppConfig::from_toml(
            r#"
            [files]
            default_max_file_size_mb = 200

            [resources.documents]
            info_excluded_fields = ["internal"]

            [resources.projects]
            max_file_size_mb = 50
            "#,
        )
        .unwrap();

        let registry = StaticRegistry::from_settings(&app);

        let documents = registry.config_for(&RecordType::new("documents")).unwrap();
        assert_eq!(documents.max_file_size_mb, Some(200));
        assert_eq!(documents.info_excluded_fields, vec!["internal".to_string()]);

        let projects = registry.config_for(&RecordType::new("projects")).unwrap();
        assert_eq!(projects.max_file_size(), 50_000_000);

        assert!(registry.config_for(&RecordType::new("unknown")).is_none());
    }
}
