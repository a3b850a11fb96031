//! HTTP client for the Stowage file API.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::progress::UploadProgress;
use crate::web::dto::{DeleteFileRequest, FileRecord};
use crate::{Result, StowageError};

/// Size of the body chunks handed to the transport during upload.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// The file operations the dashboard needs.
#[async_trait]
pub trait FileApi: Send + Sync {
    /// Fetch the full file list.
    async fn list_files(&self) -> Result<Vec<FileRecord>>;

    /// Upload `content` as `name`, reporting transfer progress to `progress`.
    ///
    /// Returns the public URL of the stored object.
    async fn upload_file(
        &self,
        name: &str,
        content_type: &str,
        content: Bytes,
        progress: Arc<UploadProgress>,
    ) -> Result<String>;

    /// Delete the object stored under `key`.
    async fn delete_file(&self, key: &str) -> Result<()>;

    /// Download the content behind a public URL.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Response envelope: `{ "success": bool, "error"?: string, ...payload }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Deserialize)]
struct ListPayload {
    #[serde(default)]
    files: Vec<FileRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadPayload {
    #[serde(default)]
    file_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NoPayload {}

/// Client for a Stowage server.
#[derive(Debug, Clone)]
pub struct HttpFileClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpFileClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client using a preconfigured `reqwest::Client`.
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a response body regardless of status; `success: false` becomes an error.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;

        let envelope: Envelope<T> = serde_json::from_slice(&body).map_err(|e| {
            StowageError::Http(format!("unexpected response ({status}): {e}"))
        })?;

        if envelope.success {
            Ok(envelope.data)
        } else {
            Err(StowageError::Http(
                envelope
                    .error
                    .unwrap_or_else(|| format!("request failed with status {status}")),
            ))
        }
    }
}

/// Split `content` into chunks, reporting each one to `progress` as it is
/// pulled by the transport.
fn progress_body(content: Bytes, progress: Arc<UploadProgress>) -> reqwest::Body {
    let total = content.len() as u64;
    let chunks: Vec<Bytes> = (0..content.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| content.slice(start..(start + UPLOAD_CHUNK_SIZE).min(content.len())))
        .collect();

    let mut sent = 0u64;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        progress.record(sent, total);
        Ok::<Bytes, std::io::Error>(chunk)
    });

    reqwest::Body::wrap_stream(stream)
}

#[async_trait]
impl FileApi for HttpFileClient {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let response = self.http.get(self.url("/api/list-files")).send().await?;
        let payload: ListPayload = Self::decode(response).await?;
        Ok(payload.files)
    }

    async fn upload_file(
        &self,
        name: &str,
        content_type: &str,
        content: Bytes,
        progress: Arc<UploadProgress>,
    ) -> Result<String> {
        let length = content.len() as u64;
        let part = Part::stream_with_length(progress_body(content, progress), length)
            .file_name(name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;
        let payload: UploadPayload = Self::decode(response).await?;

        payload
            .file_url
            .ok_or_else(|| StowageError::Http("upload response without fileUrl".to_string()))
    }

    async fn delete_file(&self, key: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/delete-file"))
            .json(&DeleteFileRequest {
                key: key.to_string(),
            })
            .send()
            .await?;
        let _: NoPayload = Self::decode(response).await?;
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?)
    }
}
