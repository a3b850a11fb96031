//! File handlers for the Web API.
//!
//! Each handler forwards exactly one request to the object store.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use std::sync::Arc;

use crate::store::PLACEHOLDER_CONTENT_TYPE;
use crate::web::dto::{
    ApiResponse, DeleteFileRequest, Empty, FileListData, FileRecord, UploadData, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// A file part extracted from a multipart body.
struct UploadedPart {
    filename: String,
    content_type: String,
    content: Bytes,
}

/// Pull the `file` field out of a multipart body.
///
/// Other fields are ignored.
async fn read_file_part(multipart: &mut Multipart) -> Result<Option<UploadedPart>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let Some(filename) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string)
        else {
            return Ok(None);
        };
        let content_type = field
            .content_type()
            .unwrap_or(PLACEHOLDER_CONTENT_TYPE)
            .to_string();
        let content = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file content: {}", e);
            ApiError::bad_request("Failed to read file")
        })?;

        return Ok(Some(UploadedPart {
            filename,
            content_type,
            content,
        }));
    }

    Ok(None)
}

/// POST /api/upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" field. The object key is
/// the original filename; an existing object with that key is replaced.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<UploadData>>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!("Rejected upload body: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })?;
    let part = read_file_part(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let size = part.content.len();
    state
        .store
        .put_object(&part.filename, part.content, &part.content_type)
        .await
        .map_err(|e| {
            tracing::error!(key = %part.filename, error = %e, "Upload failed");
            ApiError::from(e)
        })?;

    let file_url = state.store.public_url(&part.filename);
    tracing::info!(key = %part.filename, size, url = %file_url, "File uploaded");

    Ok(Json(ApiResponse::new(UploadData { file_url })))
}

/// GET /api/list-files - List every object in the bucket.
///
/// One list call is made. If the store truncates the result, only the first
/// page is returned.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FileListData>>, ApiError> {
    let listing = state.store.list_objects().await.map_err(|e| {
        tracing::error!(error = %e, "Error listing files");
        ApiError::from(e)
    })?;

    if listing.truncated {
        tracing::warn!(
            returned = listing.entries.len(),
            "Object listing was truncated; returning first page only"
        );
    }

    let files = listing
        .entries
        .into_iter()
        .map(|entry| {
            let url = state.store.public_url(&entry.key);
            FileRecord::from_entry(entry, url)
        })
        .collect();

    Ok(Json(ApiResponse::new(FileListData { files })))
}

/// POST /api/delete-file - Delete an object by key.
///
/// Deleting a key that does not exist succeeds.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<DeleteFileRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.store.delete_object(&req.key).await.map_err(|e| {
        tracing::error!(key = %req.key, error = %e, "Delete failed");
        ApiError::from(e)
    })?;

    tracing::info!(key = %req.key, "Deleted file");

    Ok(Json(ApiResponse::ok()))
}
