//! Client side of Stowage.
//!
//! The dashboard is driven through [`FileApi`]; [`HttpFileClient`] talks to a
//! running server over HTTP.

pub mod api;
pub mod dashboard;
pub mod format;
pub mod progress;

pub use api::{FileApi, HttpFileClient};
pub use dashboard::{Dashboard, DashboardState, DashboardStateHandle, DELETE_FAILED_MESSAGE};
pub use format::{format_file_size, guess_mime_type, FileKind};
pub use progress::UploadProgress;
