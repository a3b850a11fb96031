//! Web API module for Stowage.
//!
//! This module provides the HTTP surface of the service: upload, list and
//! delete, each forwarded to the configured object store.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
