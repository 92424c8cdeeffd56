//! src/store/sqlite.rs
//!
//! SqliteStore — single-bucket object store backed by SQLite for metadata
//! and local disk for payloads. Payloads live beneath
//! `base_path/{shard}/{shard}/{key}` with two-level md5 sharding so no one
//! directory accumulates every file. There is no cache layer: listings hit
//! SQLite on every call, which is exactly the freshness contract the
//! catalog derivers rely on.

use crate::{
    models::object::ObjectRecord,
    store::{ObjectReader, ObjectStore, StoreError, StoreResult},
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::{Stream, StreamExt, pin_mut};
use md5::Context;
use sqlx::SqlitePool;
use std::{
    collections::BTreeSet,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use uuid::Uuid;

const MAX_OBJECT_KEY_LEN: usize = 1024;

/// Object store over one SQLite metadata database and one payload directory.
///
/// Which database and directory (i.e. which "bucket") is external
/// configuration; the store itself never sees more than one.
#[derive(Clone)]
pub struct SqliteStore {
    /// Shared SQLite connection pool used for metadata operations.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where payloads are stored.
    pub base_path: PathBuf,
}

impl SqliteStore {
    pub fn new(db: Arc<SqlitePool>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            db,
            base_path: base_path.into(),
        }
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    ///
    /// Rejects empty or oversized keys, keys that begin with `/`, keys
    /// containing `..`, and keys with control bytes or backslashes.
    fn ensure_key_safe(&self, key: &str) -> StoreResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(StoreError::InvalidObjectKey);
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(StoreError::InvalidObjectKey);
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(StoreError::InvalidObjectKey);
        }
        Ok(())
    }

    /// Two-level shard identifiers for a key: first two bytes of md5(key)
    /// as lowercase hex.
    fn object_shards(key: &str) -> (String, String) {
        let digest = md5::compute(key);
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    /// Fully-qualified payload path: `base_path/{shard}/{shard}/{key}`.
    /// Parent directories may not exist yet.
    fn object_path(&self, key: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::object_shards(key);
        let mut path = self.base_path.clone();
        path.push(shard_a);
        path.push(shard_b);
        path.push(key);
        path
    }

    /// Fetch one metadata row, mapping a missing row to `ObjectNotFound`.
    async fn fetch_record(&self, key: &str) -> StoreResult<ObjectRecord> {
        sqlx::query_as::<_, ObjectRecord>(
            "SELECT key, size_bytes, content_type, etag, last_modified
             FROM objects WHERE key = ?",
        )
        .bind(key)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StoreError::ObjectNotFound(key.to_string()),
            other => StoreError::Sqlx(other),
        })
    }

    /// Stream-ingest a payload and upsert its metadata row.
    ///
    /// - Writes bytes incrementally to a temporary file.
    /// - Computes md5/etag and size while streaming.
    /// - Atomically renames into final location.
    /// - Upserts the row (last write wins, S3-like overwrite semantics).
    ///
    /// Ensures durable writes (fsync) and cleans up temp files on errors.
    pub async fn put_object_stream<S>(
        &self,
        key: &str,
        content_type: Option<String>,
        stream: S,
    ) -> StoreResult<ObjectRecord>
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        self.ensure_key_safe(key)?;

        let file_path = self.object_path(key);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StoreError::Io(io::Error::other("object path missing parent directory"))
        })?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        let mut size_bytes: i64 = 0;
        let mut digest = Context::new();
        pin_mut!(stream);
        while let Some(chunk_res) = stream.next().await {
            let chunk = match chunk_res {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = fs::remove_file(&tmp_path).await;
                    return Err(StoreError::Io(err));
                }
            };
            size_bytes += chunk.len() as i64;
            digest.consume(&chunk);
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }

        let etag = format!("{:x}", digest.compute());
        let insert_result = sqlx::query_as::<_, ObjectRecord>(
            r#"
            INSERT INTO objects (key, size_bytes, content_type, etag, last_modified)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                size_bytes = excluded.size_bytes,
                content_type = excluded.content_type,
                etag = excluded.etag,
                last_modified = excluded.last_modified
            RETURNING key, size_bytes, content_type, etag, last_modified
            "#,
        )
        .bind(key)
        .bind(size_bytes)
        .bind(content_type)
        .bind(&etag)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await;

        match insert_result {
            Ok(record) => Ok(record),
            Err(err) => {
                let _ = fs::remove_file(&file_path).await;
                Err(StoreError::Sqlx(err))
            }
        }
    }
}

#[async_trait]
impl ObjectStore for SqliteStore {
    /// Depth-1 common prefixes, computed from the full key listing the same
    /// way a delimiter-grouped ListObjects call would report them.
    async fn list_prefixes(&self) -> StoreResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM objects ORDER BY key ASC")
            .fetch_all(&*self.db)
            .await?;

        let mut prefixes = BTreeSet::new();
        for key in keys {
            if let Some(pos) = key.find('/') {
                prefixes.insert(key[..pos + 1].to_string());
            }
        }
        Ok(prefixes.into_iter().collect())
    }

    async fn list_objects(&self, prefix: &str) -> StoreResult<Vec<ObjectRecord>> {
        let records = sqlx::query_as::<_, ObjectRecord>(
            "SELECT key, size_bytes, content_type, etag, last_modified
             FROM objects WHERE key LIKE ? ORDER BY key ASC",
        )
        .bind(format!("{}%", prefix))
        .fetch_all(&*self.db)
        .await?;
        Ok(records)
    }

    /// Metadata plus an opened payload reader. A row whose physical file has
    /// gone missing reports `ObjectNotFound` rather than a bare I/O error.
    async fn get_object(&self, key: &str) -> StoreResult<(ObjectRecord, ObjectReader)> {
        self.ensure_key_safe(key)?;
        let record = self.fetch_record(key).await?;

        let file_path = self.object_path(key);
        let file = File::open(&file_path).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                StoreError::ObjectNotFound(key.to_string())
            } else {
                StoreError::Io(err)
            }
        })?;

        Ok((record, Box::new(file) as ObjectReader))
    }
}
