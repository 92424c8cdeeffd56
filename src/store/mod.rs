//! Backing-store abstraction: the listing collaborator the catalog derivers
//! are pure functions of.
//!
//! The catalog core only needs two listing operations; `get_object` exists
//! for the passthrough download path and is never consulted during
//! derivation. Bucket identity (which database, which payload directory) is
//! fixed at construction time from external configuration, so none of the
//! operations take a bucket parameter.

use crate::models::object::ObjectRecord;
use async_trait::async_trait;
use std::io;
use thiserror::Error;
use tokio::io::AsyncRead;

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Streamed payload handle returned by [`ObjectStore::get_object`].
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    ObjectNotFound(String),
    #[error("invalid object key")]
    InvalidObjectKey,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Listing capability of the backing object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Depth-1 common prefixes of the key space, delimiter `/`, each with
    /// its trailing delimiter kept (`"Animals/"`). Keys without a delimiter
    /// belong to no prefix and are not represented.
    async fn list_prefixes(&self) -> StoreResult<Vec<String>>;

    /// All objects whose key starts with `prefix`, in listing order.
    async fn list_objects(&self, prefix: &str) -> StoreResult<Vec<ObjectRecord>>;

    /// Metadata plus an opened payload reader for one key.
    async fn get_object(&self, key: &str) -> StoreResult<(ObjectRecord, ObjectReader)>;
}
