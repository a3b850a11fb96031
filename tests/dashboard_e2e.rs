//! Dashboard E2E Tests
//!
//! Drives a real server over HTTP with the dashboard client.

mod common;

use std::sync::Arc;

use bytes::Bytes;

use common::{memory_store, spawn_server, TEST_BUCKET, TEST_ENDPOINT};
use stowage::client::{
    Dashboard, DashboardState, FileApi, HttpFileClient, UploadProgress, DELETE_FAILED_MESSAGE,
};
use stowage::store::MemoryObjectStore;

async fn connect() -> (Arc<MemoryObjectStore>, Dashboard<HttpFileClient>) {
    let (store, client) = connect_client().await;
    (store, Dashboard::new(client, 100))
}

async fn connect_client() -> (Arc<MemoryObjectStore>, HttpFileClient) {
    let store = memory_store();
    let addr = spawn_server(store.clone()).await;
    (store, HttpFileClient::new(format!("http://{}", addr)))
}

#[tokio::test]
async fn test_mount_empty_bucket() {
    let (_store, mut dashboard) = connect().await;

    dashboard.mount().await;

    assert_eq!(dashboard.state(), DashboardState::ListLoaded);
    assert!(dashboard.files().is_empty());
}

#[tokio::test]
async fn test_upload_and_list() {
    let (store, mut dashboard) = connect().await;
    dashboard.mount().await;

    let url = dashboard
        .upload("hello.txt", "text/plain", Bytes::from_static(b"hello world"))
        .await
        .unwrap();

    assert_eq!(url, format!("{}/{}/hello.txt", TEST_ENDPOINT, TEST_BUCKET));
    assert_eq!(dashboard.progress_handle().percent(), 100);
    assert_eq!(dashboard.files().len(), 1);
    assert_eq!(dashboard.files()[0].size, 11);

    let stored = store.get("hello.txt").unwrap();
    assert_eq!(stored.content_type, "text/plain");
}

#[tokio::test]
async fn test_large_upload_reports_progress() {
    let (store, client) = connect_client().await;
    let progress = Arc::new(UploadProgress::new());
    progress.start();

    let content = Bytes::from(vec![7u8; 512 * 1024]);
    client
        .upload_file("blob.bin", "application/octet-stream", content, progress.clone())
        .await
        .unwrap();

    assert_eq!(progress.percent(), 99);
    assert_eq!(store.get("blob.bin").unwrap().content.len(), 512 * 1024);
}

#[tokio::test]
async fn test_duplicate_upload_is_listed_once() {
    let (_store, mut dashboard) = connect().await;

    dashboard
        .upload("dup.txt", "text/plain", Bytes::from_static(b"one"))
        .await
        .unwrap();
    dashboard
        .upload("dup.txt", "text/plain", Bytes::from_static(b"three"))
        .await
        .unwrap();

    let matching: Vec<_> = dashboard
        .files()
        .iter()
        .filter(|f| f.name == "dup.txt")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].size, 5);
}

#[tokio::test]
async fn test_upload_failure_is_reported() {
    let (store, mut dashboard) = connect().await;
    store.set_failing(true);

    let err = dashboard
        .upload("a.txt", "text/plain", Bytes::from_static(b"a"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("object store unavailable"));
    assert!(!dashboard.progress_handle().is_active());
    assert!(dashboard.files().is_empty());
}

#[tokio::test]
async fn test_delete_and_reconcile() {
    let (_store, mut dashboard) = connect().await;
    dashboard
        .upload("a.txt", "text/plain", Bytes::from_static(b"a"))
        .await
        .unwrap();
    dashboard
        .upload("b.txt", "text/plain", Bytes::from_static(b"b"))
        .await
        .unwrap();
    assert!(dashboard.select("a.txt"));

    dashboard.delete("a.txt").await.unwrap();

    assert!(dashboard.selected().is_none());
    let names: Vec<_> = dashboard.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["b.txt"]);
}

#[tokio::test]
async fn test_delete_absent_key() {
    let (_store, mut dashboard) = connect().await;
    assert!(dashboard.delete("ghost.txt").await.is_ok());
}

#[tokio::test]
async fn test_delete_failure_is_generic() {
    let (store, mut dashboard) = connect().await;
    dashboard
        .upload("a.txt", "text/plain", Bytes::from_static(b"a"))
        .await
        .unwrap();
    store.set_failing(true);

    let err = dashboard.delete("a.txt").await.unwrap_err();

    assert!(err.to_string().contains(DELETE_FAILED_MESSAGE));
    assert_eq!(dashboard.files().len(), 1);
}

#[tokio::test]
async fn test_list_failure_surfaces_server_message() {
    let (store, client) = connect_client().await;
    store.set_failing(true);

    let err = client.list_files().await.unwrap_err();
    assert!(err.to_string().contains("object store unavailable"));
}
