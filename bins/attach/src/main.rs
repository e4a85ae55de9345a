//! Folio attach
//!
//! Manages the files of one record from the command line, over the storage
//! provider configured in `config/` and `FOLIO__*` environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use folio_core::files::{
    Collaborators, FileCoordinator, FileUpload, ResourceConfig, ResourceRegistry, StaticRegistry,
};
use folio_core::interaction::{AutoConfirm, TracingNotifier};
use folio_core::record::{MemoryRecordStore, Record};
use folio_core::storage::{StorageConfig, StorageService};
use folio_shared::{AppConfig, RecordRef, RecordType};

#[derive(Parser)]
#[command(name = "folio-attach")]
#[command(about = "Manage the files attached to a record", long_about = None)]
struct Cli {
    /// Record type, e.g. `documents`.
    record_type: String,

    /// Record PID.
    pid: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the file list.
    List,
    /// Upload files, each under its own name.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Store the uploads as new versions of this key.
        #[arg(short, long)]
        replace: Option<String>,
    },
    /// Delete one version of a file.
    Delete {
        /// File key.
        key: String,

        /// Version to delete; the head when omitted.
        #[arg(short, long)]
        version: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    folio_shared::telemetry::init(&config.telemetry)?;

    let cli = Cli::parse();
    let record = RecordRef::new(cli.record_type.as_str(), cli.pid.as_str());

    let storage = StorageService::from_config(StorageConfig::from(&config.storage))?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "storage configured"
    );

    let record_type = RecordType::new(cli.record_type.as_str());
    let records = MemoryRecordStore::new();
    records.insert(record.clone(), Record::new(cli.pid.as_str(), serde_json::Map::new()));
    records.insert_schema(record_type.clone(), json!({ "type": "object" }));

    let mut registry = StaticRegistry::from_settings(&config);
    if registry.config_for(&record_type).is_none() {
        registry.register(
            record_type,
            ResourceConfig::new().with_max_file_size_mb(config.files.default_max_file_size_mb),
        );
    }

    let coordinator = FileCoordinator::init(
        record,
        &registry,
        Collaborators {
            records: Arc::new(records),
            files: Arc::new(storage),
            confirmation: Arc::new(AutoConfirm::accept()),
            notifier: Arc::new(TracingNotifier),
        },
    )
    .await?;

    match cli.command {
        Command::List => {}
        Command::Upload { paths, replace } => {
            let mut uploads = Vec::with_capacity(paths.len());
            for path in &paths {
                uploads.push(
                    FileUpload::open(path)
                        .await
                        .with_context(|| format!("cannot open {}", path.display()))?,
                );
            }
            let current = replace.and_then(|key| {
                coordinator
                    .snapshot()
                    .files
                    .into_iter()
                    .find(|f| f.is_head && f.key == key)
            });
            let failed = coordinator
                .upload(uploads, current.as_ref())
                .await
                .into_iter()
                .filter(Result::is_err)
                .count();
            if failed > 0 {
                anyhow::bail!("{failed} upload(s) failed");
            }
        }
        Command::Delete { key, version } => {
            let entry = coordinator
                .snapshot()
                .files
                .into_iter()
                .find(|f| {
                    f.key == key
                        && version
                            .as_deref()
                            .map_or(f.is_head, |v| f.version_id == v)
                })
                .with_context(|| format!("no such file: {key}"))?;
            coordinator.delete(&entry).await?;
        }
    }

    let snapshot = coordinator.snapshot();
    let output = json!({
        "record": coordinator.record().to_string(),
        "has_error": snapshot.has_error,
        "files": snapshot.files,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    coordinator.dispose();
    Ok(())
}
