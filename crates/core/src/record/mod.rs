//! Record documents and the record store collaborator.
//!
//! Per-file metadata lives inside the parent record under `_files`; this
//! module reads and writes that collection and builds the metadata form from
//! the record type's schema.

mod cleanup;
mod error;
mod memory;
pub mod schema;
mod store;
mod types;

pub use cleanup::remove_empty_values;
pub use error::RecordError;
pub use memory::MemoryRecordStore;
pub use schema::FormField;
pub use store::RecordStore;
pub use types::{FILES_FIELD, Record};
