//! Stowage - a file storage front end for S3-compatible object stores
//!
//! The server forwards upload, list and delete calls to a bucket. The client
//! side keeps a dashboard view of the bucket and a local single-user session.

pub mod auth;
pub mod client;
pub mod config;
pub mod datetime;
pub mod error;
pub mod logging;
pub mod store;
pub mod web;

pub use auth::{AuthError, AuthStore, JsonFileStore, KeyValueStore, SessionRecord, SignupRequest};
pub use client::{Dashboard, DashboardState, FileApi, HttpFileClient, UploadProgress};
pub use config::Config;
pub use error::{Result, StowageError};
pub use store::{MemoryObjectStore, ObjectStore, S3ObjectStore, SharedObjectStore};
pub use web::WebServer;
