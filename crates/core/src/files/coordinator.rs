//! File attachment coordinator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use folio_shared::RecordRef;
use futures::StreamExt;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::{ResourceConfig, ResourceRegistry};
use super::error::FilesError;
use super::types::{FileEntry, FileUpload, FilesSnapshot, MetadataForm, UploadForm};
use super::visibility;
use crate::interaction::{Confirmation, Notifier};
use crate::record::{FormField, Record, RecordStore, schema};
use crate::storage::FileStore;

/// Notification after a successful upload.
pub const UPLOAD_SUCCESS: &str = "File uploaded successfully.";
/// Notification after a successful delete.
pub const DELETE_SUCCESS: &str = "File removed successfully.";
/// Notification after metadata is saved.
pub const METADATA_SUCCESS: &str = "Metadata have been saved successfully.";
/// Notification when the metadata form is invalid.
pub const FORM_ERRORS: &str = "The form contains errors.";
/// Title of the delete confirmation.
pub const CONFIRM_TITLE: &str = "Confirmation";
/// Body of the delete confirmation.
pub const CONFIRM_DELETE: &str = "Do you really want to remove this file?";

/// External collaborators of a coordinator.
pub struct Collaborators<R, F> {
    /// Record documents and schemas.
    pub records: Arc<R>,
    /// Versioned file blobs.
    pub files: Arc<F>,
    /// Yes/no questions to the user.
    pub confirmation: Arc<dyn Confirmation>,
    /// Outcome reporting.
    pub notifier: Arc<dyn Notifier>,
}

/// Maintains the file list of one record and mediates changes to it.
///
/// State is published through a [`watch`] channel so presentation layers can
/// render every change. Operations are not serialized against each other; the
/// last refresh wins.
pub struct FileCoordinator<R: RecordStore, F: FileStore> {
    record: RecordRef,
    config: ResourceConfig,
    excluded_fields: Vec<String>,
    form_fields: Vec<FormField>,
    records: Arc<R>,
    files: Arc<F>,
    confirmation: Arc<dyn Confirmation>,
    notifier: Arc<dyn Notifier>,
    state: Arc<watch::Sender<FilesSnapshot>>,
    document: Mutex<Option<Record>>,
    can_add_subscription: Mutex<Option<CancellationToken>>,
    shutdown: CancellationToken,
}

impl<R: RecordStore, F: FileStore> FileCoordinator<R, F> {
    /// Builds a coordinator for `record` and loads its files.
    ///
    /// The metadata form is built from the record type's schema when it
    /// describes `_files` items. A schema that cannot be fetched leaves the
    /// form empty.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::UnknownResource`] if the registry has no
    /// configuration for the record type.
    pub async fn init(
        record: RecordRef,
        registry: &dyn ResourceRegistry,
        collaborators: Collaborators<R, F>,
    ) -> Result<Self, FilesError> {
        let config = registry
            .config_for(&record.record_type)
            .ok_or_else(|| FilesError::UnknownResource(record.record_type.to_string()))?;
        let excluded_fields = config.excluded_fields();

        let form_fields = match collaborators.records.schema(&record.record_type).await {
            Ok(document) => schema::file_form_fields(&document).unwrap_or_else(|e| {
                warn!(record_type = %record.record_type, error = %e, "invalid file metadata schema");
                None
            }),
            Err(e) => {
                warn!(record_type = %record.record_type, error = %e, "cannot load record schema");
                None
            }
        }
        .unwrap_or_default();

        let (state, _) = watch::channel(FilesSnapshot::default());
        let coordinator = Self {
            record,
            config,
            excluded_fields,
            form_fields,
            records: collaborators.records,
            files: collaborators.files,
            confirmation: collaborators.confirmation,
            notifier: collaborators.notifier,
            state: Arc::new(state),
            document: Mutex::new(None),
            can_add_subscription: Mutex::new(None),
            shutdown: CancellationToken::new(),
        };

        coordinator.refresh().await?;
        Ok(coordinator)
    }

    /// Record whose files are coordinated.
    #[must_use]
    pub fn record(&self) -> &RecordRef {
        &self.record
    }

    /// Metadata form fields built from the record schema.
    #[must_use]
    pub fn form_fields(&self) -> &[FormField] {
        &self.form_fields
    }

    /// Metadata fields hidden from the information panel.
    #[must_use]
    pub fn excluded_fields(&self) -> &[String] {
        &self.excluded_fields
    }

    /// Receiver notified on every published change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FilesSnapshot> {
        self.state.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> FilesSnapshot {
        self.state.borrow().clone()
    }

    /// Re-fetches the record and its files and publishes the result.
    ///
    /// Failures to fetch are not returned: the list becomes empty and
    /// `has_error` is set. A later successful refresh clears the flag.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Disposed`] once the coordinator is disposed.
    pub async fn refresh(&self) -> Result<Vec<FileEntry>, FilesError> {
        self.ensure_active()?;
        self.publish(|s| s.loading = true);

        let loaded = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => return Err(FilesError::Disposed),
            loaded = self.load() => loaded,
        };

        match loaded {
            Ok((document, files)) => {
                debug!(
                    record_type = %self.record.record_type,
                    pid = %self.record.pid,
                    count = files.len(),
                    "files refreshed"
                );
                *lock(&self.document) = Some(document);
                self.publish(|s| {
                    s.files.clone_from(&files);
                    s.has_error = false;
                    s.loading = false;
                });
                self.subscribe_can_add();
                Ok(files)
            }
            Err(e) => {
                warn!(
                    record_type = %self.record.record_type,
                    pid = %self.record.pid,
                    error = %e,
                    "cannot load files"
                );
                self.publish(|s| {
                    s.files.clear();
                    s.has_error = true;
                    s.loading = false;
                });
                Ok(Vec::new())
            }
        }
    }

    async fn load(&self) -> Result<(Record, Vec<FileEntry>), FilesError> {
        let document = self.records.get(&self.record).await?;
        let mut files = self.files.list(&self.record).await?;

        for file in &mut files {
            file.show_info = true;
            file.show_children = false;
            file.url = Some(self.files.url_for(&self.record, &file.key));
            file.metadata = document.file_metadata(&file.key);
        }

        let hooks = &self.config.hooks;
        files.retain(|f| hooks.filter(f));
        files.sort_by(|a, b| hooks.order(a, b));

        Ok((document, files))
    }

    /// Replaces the add eligibility subscription with a fresh one.
    fn subscribe_can_add(&self) {
        let token = self.shutdown.child_token();
        if let Some(previous) = lock(&self.can_add_subscription).replace(token.clone()) {
            previous.cancel();
        }

        let mut statuses = self.config.hooks.can_add(&self.record);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    next = statuses.next() => match next {
                        Some(status) => state.send_modify(|s| s.can_add = status),
                        None => break,
                    },
                }
            }
        });
    }

    /// Whether `file` is displayed in the current list.
    #[must_use]
    pub fn show_item(&self, file: &FileEntry) -> bool {
        visibility::show_item(&self.state.borrow().files, file)
    }

    /// Whether `file` has older versions in the current list.
    #[must_use]
    pub fn has_children(&self, file: &FileEntry) -> bool {
        visibility::has_children(&self.state.borrow().files, file)
    }

    /// Metadata shown in the information panel of `file`.
    #[must_use]
    pub fn info_fields(&self, file: &FileEntry) -> Map<String, Value> {
        visibility::info_fields(file, &self.excluded_fields)
    }

    /// Expands or collapses the older versions of `file`'s key.
    ///
    /// Returns `false` if the key has no head in the current list.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Disposed`] once the coordinator is disposed.
    pub fn toggle_children(&self, file: &FileEntry) -> Result<bool, FilesError> {
        self.ensure_active()?;
        let mut toggled = false;
        self.publish(|s| toggled = visibility::toggle_children(&mut s.files, &file.key));
        Ok(toggled)
    }

    /// Opens the upload form, replacing `current` or adding a new file when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Disposed`] once the coordinator is disposed.
    pub fn manage_file(&self, current: Option<FileEntry>) -> Result<(), FilesError> {
        self.ensure_active()?;
        self.publish(|s| s.upload_form = Some(UploadForm { current }));
        Ok(())
    }

    /// Closes the open form. Closing a metadata editor reloads the files.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Disposed`] once the coordinator is disposed.
    pub async fn close_form(&self) -> Result<(), FilesError> {
        self.ensure_active()?;
        let mut had_model = false;
        self.publish(|s| {
            s.upload_form = None;
            had_model = s.metadata_form.take().is_some();
        });
        if had_model {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Uploads files, each independently and in order.
    ///
    /// A file replaces `current` when given, otherwise it is stored under its
    /// own name. Failures are notified and do not stop the following files.
    pub async fn upload(
        &self,
        uploads: Vec<FileUpload>,
        current: Option<&FileEntry>,
    ) -> Vec<Result<FileEntry, FilesError>> {
        let mut outcomes = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let outcome = self.upload_one(upload, current).await;
            if let Err(e) = &outcome {
                if !matches!(e, FilesError::Disposed) {
                    self.notifier.error(&e.to_string());
                }
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn upload_one(
        &self,
        upload: FileUpload,
        current: Option<&FileEntry>,
    ) -> Result<FileEntry, FilesError> {
        self.ensure_active()?;

        let max = self.config.max_file_size();
        if upload.size > max {
            warn!(
                record_type = %self.record.record_type,
                pid = %self.record.pid,
                name = %upload.name,
                size = upload.size,
                max,
                "upload rejected"
            );
            return Err(FilesError::size_limit_exceeded(upload.name, upload.size, max));
        }

        let key = current.map_or_else(|| upload.name.clone(), |c| c.key.clone());
        if key.is_empty() {
            return Err(FilesError::EmptyKey);
        }

        let content = upload.read_all(max).await?;
        self.ensure_active()?;
        let entry = self.files.put(&self.record, &key, content).await?;
        info!(
            record_type = %self.record.record_type,
            pid = %self.record.pid,
            key = %entry.key,
            version_id = %entry.version_id,
            "file uploaded"
        );

        // Stored; disposal only skips the follow-up.
        if self.is_disposed() {
            return Ok(entry);
        }
        let follow_up = async {
            self.close_form().await?;
            self.notifier.success(UPLOAD_SUCCESS);
            self.refresh().await
        };
        match follow_up.await {
            Ok(_) | Err(FilesError::Disposed) => Ok(entry),
            Err(e) => Err(e),
        }
    }

    /// Deletes one version of a file after confirmation.
    ///
    /// Returns `false` when the user declines.
    ///
    /// # Errors
    ///
    /// Returns the store error, after notifying it.
    pub async fn delete(&self, file: &FileEntry) -> Result<bool, FilesError> {
        self.ensure_active()?;
        if !self.confirmation.confirm(CONFIRM_TITLE, CONFIRM_DELETE).await {
            return Ok(false);
        }
        self.ensure_active()?;

        if let Err(e) = self
            .files
            .delete(&self.record, &file.key, &file.version_id)
            .await
        {
            let e = FilesError::from(e);
            self.notifier.error(&e.to_string());
            return Err(e);
        }
        info!(
            record_type = %self.record.record_type,
            pid = %self.record.pid,
            key = %file.key,
            version_id = %file.version_id,
            "file removed"
        );

        self.refresh().await?;
        self.notifier.success(DELETE_SUCCESS);
        Ok(true)
    }

    /// Opens the metadata editor for `file`.
    ///
    /// Returns `None` without opening anything when the file has no metadata.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Disposed`] once the coordinator is disposed.
    pub fn edit_metadata(&self, file: &FileEntry) -> Result<Option<MetadataForm>, FilesError> {
        self.ensure_active()?;
        let Some(metadata) = &file.metadata else {
            return Ok(None);
        };

        let form = MetadataForm {
            key: file.key.clone(),
            model: metadata.clone(),
            fields: self.form_fields.clone(),
        };
        self.publish(|s| s.metadata_form = Some(form.clone()));
        Ok(Some(form))
    }

    /// Validates `model` and stores it as the metadata of the edited file.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::NoActiveForm`] if no editor is open,
    /// [`FilesError::Validation`] if the model is invalid, or the record store
    /// error. Validation and store errors are notified.
    pub async fn save_metadata(&self, model: Map<String, Value>) -> Result<Record, FilesError> {
        self.ensure_active()?;
        let Some(form) = self.state.borrow().metadata_form.clone() else {
            return Err(FilesError::NoActiveForm);
        };

        let errors = schema::validate(&form.fields, &model);
        if !errors.is_empty() {
            warn!(
                record_type = %self.record.record_type,
                pid = %self.record.pid,
                key = %form.key,
                ?errors,
                "invalid file metadata"
            );
            self.notifier.error(FORM_ERRORS);
            return Err(FilesError::Validation(errors));
        }

        let updated = match self.write_metadata(&form.key, model).await {
            Ok(updated) => updated,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Err(e);
            }
        };
        info!(
            record_type = %self.record.record_type,
            pid = %self.record.pid,
            key = %form.key,
            "file metadata saved"
        );

        self.refresh().await?;
        self.publish(|s| s.metadata_form = None);
        self.notifier.success(METADATA_SUCCESS);
        Ok(updated)
    }

    async fn write_metadata(&self, key: &str, model: Map<String, Value>) -> Result<Record, FilesError> {
        let cached = lock(&self.document).clone();
        let mut document = match cached {
            Some(document) => document,
            None => self.records.get(&self.record).await?,
        };

        document.set_file_metadata(key, model);
        document.clean_files_metadata();

        self.ensure_active()?;
        Ok(self.records.update(&self.record, document).await?)
    }

    /// Stops every subscription; later actions return [`FilesError::Disposed`].
    pub fn dispose(&self) {
        if !self.shutdown.is_cancelled() {
            debug!(
                record_type = %self.record.record_type,
                pid = %self.record.pid,
                "file coordinator disposed"
            );
        }
        self.shutdown.cancel();
    }

    /// Whether [`FileCoordinator::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn ensure_active(&self) -> Result<(), FilesError> {
        if self.shutdown.is_cancelled() {
            return Err(FilesError::Disposed);
        }
        Ok(())
    }

    fn publish(&self, modify: impl FnOnce(&mut FilesSnapshot)) {
        if !self.shutdown.is_cancelled() {
            self.state.send_modify(modify);
        }
    }
}

impl<R: RecordStore, F: FileStore> Drop for FileCoordinator<R, F> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
