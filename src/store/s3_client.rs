//! S3-compatible object store backed by `rust-s3`.

use async_trait::async_trait;
use bytes::Bytes;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::Region;

use super::{object_url, ObjectEntry, ObjectListing, ObjectStore};
use crate::config::StorageConfig;
use crate::{Result, StowageError};

/// Object store talking to an S3-compatible endpoint.
///
/// Every operation is a single request. Nothing is retried.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    endpoint: String,
    bucket_name: String,
}

impl S3ObjectStore {
    /// Create a client for the configured endpoint and bucket.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StowageError::Config(format!("invalid S3 credentials: {e}")))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StowageError::Config(format!("invalid S3 bucket: {e}")))?;

        let bucket = if config.path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self {
            bucket,
            endpoint: config.endpoint.clone(),
            bucket_name: config.bucket.clone(),
        })
    }
}

/// Turn a non-success status code into a storage error.
fn check_status(operation: &str, key: &str, status: u16) -> Result<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(StowageError::Storage(format!(
            "{operation} {key} failed with status {status}"
        )))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, key: &str, content: Bytes, content_type: &str) -> Result<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &content, content_type)
            .await?;
        check_status("PutObject", key, response.status_code())
    }

    async fn list_objects(&self) -> Result<ObjectListing> {
        let (page, status) = self
            .bucket
            .list_page(String::new(), None, None, None, None)
            .await?;
        check_status("ListObjectsV2", &self.bucket_name, status)?;

        let entries = page
            .contents
            .into_iter()
            .map(|obj| ObjectEntry {
                key: obj.key,
                size: obj.size,
                last_modified: obj.last_modified,
            })
            .collect();

        Ok(ObjectListing {
            entries,
            truncated: page.is_truncated,
        })
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let response = self.bucket.delete_object(key).await?;
        match response.status_code() {
            // Some S3-compatible stores report absent keys explicitly
            404 => Ok(()),
            status => check_status("DeleteObject", key, status),
        }
    }

    fn public_url(&self, key: &str) -> String {
        object_url(&self.endpoint, &self.bucket_name, key)
    }
}
