//! Shared types and configuration for Folio.
//!
//! This crate provides common pieces used across all other crates:
//! - Typed record references (`RecordType`, `RecordPid`, `RecordRef`)
//! - Configuration management
//! - Telemetry (tracing subscriber) initialization

pub mod config;
pub mod telemetry;
pub mod types;

pub use config::AppConfig;
pub use types::{RecordPid, RecordRef, RecordType};
