//! Response DTOs for the Web API.

use serde::{Deserialize, Serialize};

use crate::store::{ObjectEntry, PLACEHOLDER_CONTENT_TYPE};

// ============================================================================
// Generic Response Wrapper
// ============================================================================

/// Successful API response: `{ "success": true, ...payload }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `true`; failures are rendered by `ApiError`.
    pub success: bool,
    /// Response payload, flattened next to `success`.
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new successful response.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl ApiResponse<Empty> {
    /// Successful response without payload.
    pub fn ok() -> Self {
        Self::new(Empty {})
    }
}

/// Empty payload.
#[derive(Debug, Serialize)]
pub struct Empty {}

// ============================================================================
// File DTOs
// ============================================================================

/// Upload payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
    /// Public URL of the stored object.
    pub file_url: String,
}

/// List payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListData {
    /// Files in store order.
    pub files: Vec<FileRecord>,
}

/// A file as shown on the dashboard.
///
/// Identity is the storage key: `id` and `name` both hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Record ID (the storage key).
    pub id: String,
    /// Display name (the storage key).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Last-modified timestamp.
    pub date: String,
    /// Public URL.
    pub url: String,
}

impl FileRecord {
    /// Map a listing entry to a record.
    ///
    /// The listing carries no content type, so the placeholder type is used.
    pub fn from_entry(entry: ObjectEntry, url: String) -> Self {
        Self {
            id: entry.key.clone(),
            name: entry.key,
            size: entry.size,
            mime_type: PLACEHOLDER_CONTENT_TYPE.to_string(),
            date: entry.last_modified,
            url,
        }
    }
}
