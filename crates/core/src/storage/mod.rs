//! Versioned file storage for record attachments using Apache OpenDAL.
//!
//! Supported providers:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - In-process memory (tests)
//!
//! # Layout
//!
//! ```text
//! {record_type}/{pid}/{key}/{version_id}
//! ```
//!
//! Version ids are UUID v7, so the greatest id of a key is its head.

mod config;
mod error;
mod service;
mod store;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::StorageService;
pub use store::FileStore;
