//! Object references flowing through the pipeline.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An object reported by a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// The object key (full path within the bucket)
    pub key: String,

    /// Size of the object in bytes
    pub size: u64,

    /// Last modified timestamp
    pub last_modified: DateTime<Utc>,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(key: impl Into<String>, size: u64, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified,
        }
    }

    /// Time elapsed between the last modification and `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_modified
    }
}

/// An object fetched into local storage.
///
/// The file at `path` belongs to whoever receives this record; the pipeline
/// never deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedObject {
    /// Local path of the downloaded copy
    pub path: PathBuf,

    /// Key of the object in the bucket
    pub key: String,

    /// Number of bytes written to `path`
    pub bytes: u64,
}
