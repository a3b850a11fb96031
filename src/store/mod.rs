//! Object store layer for Stowage.
//!
//! This module provides the three remote operations the service forwards to:
//! - Put an object under a key (overwriting any existing object)
//! - List the objects of the bucket (a single page, no continuation)
//! - Delete an object by key (idempotent)
//!
//! Backends:
//! - [`S3ObjectStore`]: any S3-compatible endpoint via `rust-s3`
//! - [`MemoryObjectStore`]: process-local map with the same semantics

mod memory;
mod s3_client;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::StorageConfig;
use crate::{Result, StowageError};

pub use memory::{MemoryObjectStore, StoredObject};
pub use s3_client::S3ObjectStore;

/// Content type reported for every listed object.
///
/// The list call does not read back per-object metadata.
pub const PLACEHOLDER_CONTENT_TYPE: &str = "application/octet-stream";

/// A single entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last-modified timestamp as reported by the store.
    pub last_modified: String,
}

/// Result of a single list call.
#[derive(Debug, Clone, Default)]
pub struct ObjectListing {
    /// Entries in store order.
    pub entries: Vec<ObjectEntry>,
    /// Whether the store reported more entries than it returned.
    pub truncated: bool,
}

/// Remote object store operations.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `content` under `key`, replacing any existing object.
    async fn put_object(&self, key: &str, content: Bytes, content_type: &str) -> Result<()>;

    /// List the bucket with one request.
    async fn list_objects(&self) -> Result<ObjectListing>;

    /// Delete the object under `key`. Deleting an absent key succeeds.
    async fn delete_object(&self, key: &str) -> Result<()>;

    /// Public URL of the object under `key`.
    fn public_url(&self, key: &str) -> String;
}

/// Shared handle to an object store.
pub type SharedObjectStore = Arc<dyn ObjectStore>;

/// Build the public URL of an object: `endpoint/bucket/key`.
///
/// The key is appended verbatim.
pub fn object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
}

/// Create the object store selected by the configuration.
pub fn from_config(config: &StorageConfig) -> Result<SharedObjectStore> {
    match config.backend.as_str() {
        "s3" => Ok(Arc::new(S3ObjectStore::new(config)?)),
        "memory" => Ok(Arc::new(MemoryObjectStore::new(
            &config.endpoint,
            if config.bucket.is_empty() {
                "local"
            } else {
                config.bucket.as_str()
            },
        ))),
        other => Err(StowageError::Config(format!(
            "unknown storage backend: {other}"
        ))),
    }
}
