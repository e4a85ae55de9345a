//! Common types used across the workspace.

pub mod record;

pub use record::{RecordPid, RecordRef, RecordType};
