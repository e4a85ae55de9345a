//! Typed record references.
//!
//! Using typed identifiers prevents accidentally passing a record PID where a
//! resource type is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate string-backed identifier wrappers.
macro_rules! record_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

record_id!(RecordType, "Resource type of a record (e.g. `documents`).");
record_id!(RecordPid, "Persistent identifier of a record within its type.");

/// Reference to one record: its resource type and PID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    /// Resource type.
    pub record_type: RecordType,
    /// Record PID.
    pub pid: RecordPid,
}

impl RecordRef {
    /// Creates a new record reference.
    #[must_use]
    pub fn new(record_type: impl Into<RecordType>, pid: impl Into<RecordPid>) -> Self {
        Self {
            record_type: record_type.into(),
            pid: pid.into(),
        }
    }
}

impl std::fmt::Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.record_type, self.pid)
    }
}
