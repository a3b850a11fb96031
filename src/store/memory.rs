//! In-process object store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{object_url, ObjectEntry, ObjectListing, ObjectStore};
use crate::datetime::now_rfc3339;
use crate::{Result, StowageError};

/// A stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Object content.
    pub content: Bytes,
    /// Content type declared on upload.
    pub content_type: String,
    /// Last-modified timestamp (RFC 3339).
    pub last_modified: String,
}

/// Object store kept in memory.
///
/// Keys are listed in lexicographic order, like S3 does. A page size can be
/// set to reproduce truncated listings, and the store can be switched into a
/// failing mode to exercise error paths.
#[derive(Debug)]
pub struct MemoryObjectStore {
    endpoint: String,
    bucket: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    page_size: Option<usize>,
    failing: AtomicBool,
}

impl MemoryObjectStore {
    /// Create an empty store whose public URLs use `endpoint` and `bucket`.
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
            page_size: None,
            failing: AtomicBool::new(false),
        }
    }

    /// Limit every listing to at most `page_size` entries.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get a stored object.
    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.lock().get(key).cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StowageError::Storage(
                "object store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, key: &str, content: Bytes, content_type: &str) -> Result<()> {
        self.check_available()?;
        self.lock().insert(
            key.to_string(),
            StoredObject {
                content,
                content_type: content_type.to_string(),
                last_modified: now_rfc3339(),
            },
        );
        Ok(())
    }

    async fn list_objects(&self) -> Result<ObjectListing> {
        self.check_available()?;
        let objects = self.lock();
        let limit = self.page_size.unwrap_or(usize::MAX);

        let entries = objects
            .iter()
            .take(limit)
            .map(|(key, obj)| ObjectEntry {
                key: key.clone(),
                size: obj.content.len() as u64,
                last_modified: obj.last_modified.clone(),
            })
            .collect();

        Ok(ObjectListing {
            entries,
            truncated: objects.len() > limit,
        })
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.lock().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        object_url(&self.endpoint, &self.bucket, key)
    }
}
