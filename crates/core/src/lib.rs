//! Core file attachment logic for Folio.
//!
//! This crate coordinates the files attached to a record with ZERO UI or HTTP
//! transport dependencies. The presentation layer and the remote record API are
//! collaborators behind traits.
//!
//! # Modules
//!
//! - `files` - File attachment coordinator, visibility rules, resource configuration
//! - `record` - Record store trait, `_files` metadata helpers, metadata form schema
//! - `storage` - Versioned file store over Apache OpenDAL
//! - `interaction` - Confirmation and notification collaborators

pub mod files;
pub mod interaction;
pub mod record;
pub mod storage;
