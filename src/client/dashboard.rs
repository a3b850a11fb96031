//! Dashboard view state.
//!
//! Holds the file list, the open detail view and the upload progress. Every
//! mutating call is followed by a re-fetch of the list; when that re-fetch
//! fails the local list is patched by key instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use super::api::FileApi;
use super::progress::UploadProgress;
use crate::datetime::now_rfc3339;
use crate::web::dto::FileRecord;
use crate::{Result, StowageError};

/// Message shown when a delete fails.
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete file";

/// Bytes per megabyte for the usage summary.
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Observable state of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardState {
    /// Nothing loaded and nothing in flight.
    Idle,
    /// An upload is running.
    Uploading {
        /// Current percentage.
        progress: u8,
    },
    /// The file list has been fetched.
    ListLoaded,
    /// A file's detail view is open.
    FileSelected,
}

/// Shared view of the dashboard state.
///
/// Stays readable while the dashboard itself is borrowed by an upload.
#[derive(Debug, Clone, Default)]
pub struct DashboardStateHandle {
    progress: Arc<UploadProgress>,
    loaded: Arc<AtomicBool>,
    selected: Arc<AtomicBool>,
}

impl DashboardStateHandle {
    /// Current state.
    ///
    /// An upload in flight takes precedence over the detail view, which takes
    /// precedence over the loaded list.
    pub fn state(&self) -> DashboardState {
        if self.progress.is_active() {
            DashboardState::Uploading {
                progress: self.progress.percent(),
            }
        } else if self.selected.load(Ordering::SeqCst) {
            DashboardState::FileSelected
        } else if self.loaded.load(Ordering::SeqCst) {
            DashboardState::ListLoaded
        } else {
            DashboardState::Idle
        }
    }
}

/// Client-held dashboard.
pub struct Dashboard<A: FileApi> {
    api: A,
    files: Vec<FileRecord>,
    selected: Option<String>,
    view: DashboardStateHandle,
    storage_limit_mb: u64,
}

impl<A: FileApi> Dashboard<A> {
    /// Create an empty dashboard over `api`.
    pub fn new(api: A, storage_limit_mb: u64) -> Self {
        Self {
            api,
            files: Vec::new(),
            selected: None,
            view: DashboardStateHandle::default(),
            storage_limit_mb,
        }
    }

    /// Current state.
    pub fn state(&self) -> DashboardState {
        self.view.state()
    }

    /// Handle for observing the state from another task, e.g. while
    /// [`upload`](Self::upload) is running.
    pub fn state_handle(&self) -> DashboardStateHandle {
        self.view.clone()
    }

    /// Initial load. A failure leaves the list empty and is only logged.
    pub async fn mount(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::error!(error = %e, "Failed to load files");
        }
    }

    /// Replace the local list with the server's.
    pub async fn refresh(&mut self) -> Result<()> {
        let files = self.api.list_files().await?;
        tracing::debug!(count = files.len(), "File list loaded");
        self.files = files;
        self.view.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Upload a file and reconcile the list.
    ///
    /// Returns the public URL of the stored object.
    pub async fn upload(&mut self, name: &str, content_type: &str, content: Bytes) -> Result<String> {
        let size = content.len() as u64;
        self.view.progress.start();

        let result = self
            .api
            .upload_file(name, content_type, content, self.view.progress.clone())
            .await;

        let url = match result {
            Ok(url) => url,
            Err(e) => {
                self.view.progress.finish();
                tracing::error!(name = %name, error = %e, "Upload failed");
                return Err(e);
            }
        };

        self.view.progress.complete();
        tracing::info!(name = %name, size, "File uploaded");

        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Re-fetch after upload failed, patching local list");
            self.upsert(FileRecord {
                id: name.to_string(),
                name: name.to_string(),
                size,
                mime_type: content_type.to_string(),
                date: now_rfc3339(),
                url: url.clone(),
            });
        }

        self.view.progress.finish();
        Ok(url)
    }

    /// Delete a file and reconcile the list. Clears the detail view.
    pub async fn delete(&mut self, key: &str) -> Result<()> {
        if let Err(e) = self.api.delete_file(key).await {
            tracing::error!(key = %key, error = %e, "Delete failed");
            return Err(StowageError::Storage(DELETE_FAILED_MESSAGE.to_string()));
        }

        tracing::info!(key = %key, "File deleted");
        self.set_selected(None);

        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Re-fetch after delete failed, patching local list");
            self.files.retain(|f| f.name != key);
        }
        Ok(())
    }

    /// Open the detail view for `key`. Returns false if no such file is listed.
    pub fn select(&mut self, key: &str) -> bool {
        if self.files.iter().any(|f| f.name == key) {
            self.set_selected(Some(key.to_string()));
            true
        } else {
            false
        }
    }

    /// Close the detail view.
    pub fn close_detail(&mut self) {
        self.set_selected(None);
    }

    /// The file in the detail view, if any.
    pub fn selected(&self) -> Option<&FileRecord> {
        let key = self.selected.as_deref()?;
        self.files.iter().find(|f| f.name == key)
    }

    /// Listed files.
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Total bytes of the listed files.
    pub fn storage_used(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Usage as a percentage of the displayed quota, capped at 100.
    pub fn storage_percentage(&self) -> f64 {
        let limit = self.storage_limit_mb.saturating_mul(BYTES_PER_MB);
        if limit == 0 {
            return 100.0;
        }
        (self.storage_used() as f64 / limit as f64 * 100.0).min(100.0)
    }

    /// Displayed quota in megabytes.
    pub fn storage_limit_mb(&self) -> u64 {
        self.storage_limit_mb
    }

    /// Download the content of a listed file.
    pub async fn download(&self, key: &str) -> Result<Bytes> {
        let file = self
            .files
            .iter()
            .find(|f| f.name == key)
            .ok_or_else(|| StowageError::NotFound(format!("file {key}")))?;
        self.api.fetch(&file.url).await
    }

    /// Shared handle to the upload progress, for observers.
    pub fn progress_handle(&self) -> Arc<UploadProgress> {
        self.view.progress.clone()
    }

    fn set_selected(&mut self, key: Option<String>) {
        self.view.selected.store(key.is_some(), Ordering::SeqCst);
        self.selected = key;
    }

    fn upsert(&mut self, record: FileRecord) {
        match self.files.iter_mut().find(|f| f.name == record.name) {
            Some(existing) => *existing = record,
            None => self.files.push(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryObjectStore, ObjectStore};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Holds an upload in flight until released.
    #[derive(Default)]
    struct UploadGate {
        entered: Notify,
        release: Notify,
    }

    /// Drives the object store directly, the way the handlers do.
    struct StoreApi {
        store: Arc<MemoryObjectStore>,
        fail_list: AtomicBool,
        fail_delete: AtomicBool,
        gate: Option<Arc<UploadGate>>,
    }

    impl StoreApi {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryObjectStore::new("http://s3.test", "bucket")),
                fail_list: AtomicBool::new(false),
                fail_delete: AtomicBool::new(false),
                gate: None,
            }
        }

        fn gated(gate: Arc<UploadGate>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl FileApi for StoreApi {
        async fn list_files(&self) -> Result<Vec<FileRecord>> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(StowageError::Http("list unavailable".to_string()));
            }
            let listing = self.store.list_objects().await?;
            Ok(listing
                .entries
                .into_iter()
                .map(|entry| {
                    let url = self.store.public_url(&entry.key);
                    FileRecord::from_entry(entry, url)
                })
                .collect())
        }

        async fn upload_file(
            &self,
            name: &str,
            content_type: &str,
            content: Bytes,
            progress: Arc<UploadProgress>,
        ) -> Result<String> {
            if let Some(gate) = &self.gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            let total = content.len() as u64;
            progress.record(total / 2, total);
            self.store.put_object(name, content, content_type).await?;
            progress.record(total, total);
            Ok(self.store.public_url(name))
        }

        async fn delete_file(&self, key: &str) -> Result<()> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(StowageError::Storage("AccessDenied".to_string()));
            }
            self.store.delete_object(key).await
        }

        async fn fetch(&self, url: &str) -> Result<Bytes> {
            let key = url.rsplit('/').next().unwrap_or_default();
            self.store
                .get(key)
                .map(|o| o.content)
                .ok_or_else(|| StowageError::NotFound(key.to_string()))
        }
    }

    fn dashboard() -> Dashboard<StoreApi> {
        Dashboard::new(StoreApi::new(), 100)
    }

    #[tokio::test]
    async fn test_mount_empty() {
        let mut dash = dashboard();
        assert_eq!(dash.state(), DashboardState::Idle);

        dash.mount().await;
        assert_eq!(dash.state(), DashboardState::ListLoaded);
        assert!(dash.files().is_empty());
    }

    #[tokio::test]
    async fn test_mount_failure_keeps_empty_list() {
        let mut dash = dashboard();
        dash.api.fail_list.store(true, Ordering::SeqCst);

        dash.mount().await;
        assert_eq!(dash.state(), DashboardState::Idle);
        assert!(dash.files().is_empty());
    }

    #[tokio::test]
    async fn test_upload_reaches_100_and_lists_file() {
        let mut dash = dashboard();
        dash.mount().await;

        let url = dash
            .upload("a.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        assert_eq!(url, "http://s3.test/bucket/a.txt");
        assert_eq!(dash.progress_handle().percent(), 100);
        assert!(!dash.progress_handle().is_active());
        assert_eq!(dash.files().len(), 1);
        assert_eq!(dash.files()[0].size, 5);
    }

    #[tokio::test]
    async fn test_state_observed_during_upload() {
        let gate = Arc::new(UploadGate::default());
        let mut dash = Dashboard::new(StoreApi::gated(gate.clone()), 100);
        let handle = dash.state_handle();
        assert_eq!(handle.state(), DashboardState::Idle);

        let upload = tokio::spawn(async move {
            let result = dash
                .upload("a.txt", "text/plain", Bytes::from_static(b"hello"))
                .await;
            (dash, result)
        });

        gate.entered.notified().await;
        assert_eq!(handle.state(), DashboardState::Uploading { progress: 0 });

        gate.release.notify_one();
        let (dash, result) = upload.await.unwrap();
        result.unwrap();

        assert_eq!(handle.state(), DashboardState::ListLoaded);
        assert_eq!(dash.state(), DashboardState::ListLoaded);
        assert_eq!(dash.progress_handle().percent(), 100);
    }

    #[tokio::test]
    async fn test_state_handle_tracks_selection() {
        let mut dash = dashboard();
        let handle = dash.state_handle();
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        dash.select("a.txt");
        assert_eq!(handle.state(), DashboardState::FileSelected);

        dash.close_detail();
        assert_eq!(handle.state(), DashboardState::ListLoaded);
    }

    #[tokio::test]
    async fn test_upload_same_name_twice_lists_once() {
        let mut dash = dashboard();
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"first"))
            .await
            .unwrap();
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"second!"))
            .await
            .unwrap();

        let matching: Vec<_> = dash.files().iter().filter(|f| f.name == "a.txt").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].size, 7);
    }

    #[tokio::test]
    async fn test_upload_refetch_failure_upserts_by_key() {
        let mut dash = dashboard();
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"first"))
            .await
            .unwrap();

        dash.api.fail_list.store(true, Ordering::SeqCst);
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"second!"))
            .await
            .unwrap();
        dash.upload("b.png", "image/png", Bytes::from_static(b"png"))
            .await
            .unwrap();

        assert_eq!(dash.files().len(), 2);
        let a = dash.files().iter().find(|f| f.name == "a.txt").unwrap();
        assert_eq!(a.size, 7);
        let b = dash.files().iter().find(|f| f.name == "b.png").unwrap();
        assert_eq!(b.mime_type, "image/png");
        assert_eq!(b.url, "http://s3.test/bucket/b.png");
    }

    #[tokio::test]
    async fn test_upload_failure_reverts_to_idle() {
        let mut dash = dashboard();
        dash.api.store.set_failing(true);

        let result = dash
            .upload("a.txt", "text/plain", Bytes::from_static(b"hello"))
            .await;

        assert!(result.is_err());
        assert!(!dash.progress_handle().is_active());
        assert_eq!(dash.state(), DashboardState::Idle);
        assert!(dash.files().is_empty());
    }

    #[tokio::test]
    async fn test_delete_clears_selection_and_removes() {
        let mut dash = dashboard();
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        assert!(dash.select("a.txt"));
        assert_eq!(dash.state(), DashboardState::FileSelected);

        dash.delete("a.txt").await.unwrap();
        assert!(dash.selected().is_none());
        assert!(dash.files().is_empty());
        assert_eq!(dash.state(), DashboardState::ListLoaded);
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let mut dash = dashboard();
        dash.mount().await;
        assert!(dash.delete("missing.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_failure_is_generic() {
        let mut dash = dashboard();
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        dash.select("a.txt");
        dash.api.fail_delete.store(true, Ordering::SeqCst);

        let err = dash.delete("a.txt").await.unwrap_err();
        assert_eq!(err.to_string(), format!("storage error: {DELETE_FAILED_MESSAGE}"));
        assert_eq!(dash.files().len(), 1);
        assert!(dash.selected().is_some());
    }

    #[tokio::test]
    async fn test_delete_refetch_failure_removes_locally() {
        let mut dash = dashboard();
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        dash.api.fail_list.store(true, Ordering::SeqCst);

        dash.delete("a.txt").await.unwrap();
        assert!(dash.files().is_empty());
    }

    #[tokio::test]
    async fn test_select_unknown_file() {
        let mut dash = dashboard();
        dash.mount().await;
        assert!(!dash.select("nope"));
        assert_eq!(dash.state(), DashboardState::ListLoaded);
    }

    #[tokio::test]
    async fn test_close_detail() {
        let mut dash = dashboard();
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        dash.select("a.txt");
        assert_eq!(dash.selected().unwrap().name, "a.txt");

        dash.close_detail();
        assert!(dash.selected().is_none());
    }

    #[tokio::test]
    async fn test_storage_usage() {
        let mut dash = Dashboard::new(StoreApi::new(), 1);
        dash.upload("half.bin", "application/octet-stream", Bytes::from(vec![0u8; 512 * 1024]))
            .await
            .unwrap();
        assert_eq!(dash.storage_used(), 512 * 1024);
        assert!((dash.storage_percentage() - 50.0).abs() < f64::EPSILON);

        dash.upload("big.bin", "application/octet-stream", Bytes::from(vec![0u8; 1024 * 1024]))
            .await
            .unwrap();
        assert_eq!(dash.storage_percentage(), 100.0);
    }

    #[tokio::test]
    async fn test_download() {
        let mut dash = dashboard();
        dash.upload("a.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        assert_eq!(&dash.download("a.txt").await.unwrap()[..], b"hello");
        assert!(matches!(
            dash.download("missing").await,
            Err(StowageError::NotFound(_))
        ));
    }
}
