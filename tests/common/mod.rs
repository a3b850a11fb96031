//! Test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum_test::TestServer;

use stowage::config::{Config, WebConfig};
use stowage::store::MemoryObjectStore;
use stowage::web::handlers::AppState;
use stowage::web::router::create_router;
use stowage::WebServer;

/// Endpoint used for public URLs in tests.
pub const TEST_ENDPOINT: &str = "https://s3.test.local";

/// Bucket used in tests.
pub const TEST_BUCKET: &str = "test-bucket";

/// Create a fresh in-memory object store.
pub fn memory_store() -> Arc<MemoryObjectStore> {
    Arc::new(MemoryObjectStore::new(TEST_ENDPOINT, TEST_BUCKET))
}

/// Create a test configuration bound to an ephemeral local port.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.web = WebConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..WebConfig::default()
    };
    config.storage.backend = "memory".to_string();
    config.storage.endpoint = TEST_ENDPOINT.to_string();
    config.storage.bucket = TEST_BUCKET.to_string();
    config
}

/// Create an axum-test server over `store`.
pub fn create_test_server(store: Arc<MemoryObjectStore>) -> TestServer {
    let app_state = Arc::new(AppState::new(store));
    let router = create_router(app_state, &create_test_config().web);
    TestServer::new(router).expect("Failed to create test server")
}

/// Start the real server on an ephemeral port and return its address.
pub async fn spawn_server(store: Arc<MemoryObjectStore>) -> SocketAddr {
    let server =
        WebServer::with_store(&create_test_config(), store).expect("Failed to create web server");
    server
        .run_with_addr()
        .await
        .expect("Failed to start web server")
}
