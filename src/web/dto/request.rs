//! Request DTOs for the Web API.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Delete request: `{ "key": "<object key>" }`.
///
/// A missing `key` deserializes as empty and fails validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteFileRequest {
    /// Object key to delete.
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing file key"))]
    pub key: String,
}
