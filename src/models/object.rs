//! Represents an object stored in the backing key space.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single stored object, addressed by its `/`-delimited key.
///
/// This is the raw input the catalog derivers consume. The struct carries
/// metadata only, never the payload bytes; the catalog core reads nothing
/// beyond `key`, the rest exists for the download path.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ObjectRecord {
    /// Object key (path-like identifier, e.g. `Animals/lion.jpg`).
    pub key: String,

    /// Payload size in bytes.
    pub size_bytes: i64,

    /// Content type (MIME type) recorded at ingest time.
    pub content_type: Option<String>,

    /// MD5 checksum of the payload.
    pub etag: Option<String>,

    /// Timestamp of the last ingest for this key.
    pub last_modified: DateTime<Utc>,
}

impl ObjectRecord {
    /// Final path segment of the key (the bare file name).
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}
