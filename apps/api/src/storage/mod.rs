//! Object storage for uploaded documents.
//!
//! The orchestration layer only sees the `ObjectStore` trait; `S3ObjectStore`
//! talks to S3 / MinIO. Every S3 round trip is bounded by the configured timeout
//! and a timeout is reported exactly like any other storage failure.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Opaque reference used for later `fetch` calls.
    pub key: String,
    /// Time-limited retrieval URL.
    pub url: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn store(
        &self,
        body: Bytes,
        content_type: &str,
        folder: &str,
    ) -> Result<StoredObject, AppError>;

    async fn fetch(&self, key: &str) -> Result<Bytes, AppError>;
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    url_ttl: Duration,
    timeout: Duration,
}

impl S3ObjectStore {
    pub fn new(
        client: aws_sdk_s3::Client,
        bucket: String,
        url_ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            bucket,
            url_ttl,
            timeout,
        }
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| AppError::Storage(format!("{op} timed out after {:?}", self.timeout)))?
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn store(
        &self,
        body: Bytes,
        content_type: &str,
        folder: &str,
    ) -> Result<StoredObject, AppError> {
        let key = object_key(folder, content_type);

        self.bounded("S3 upload", async {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&key)
                .body(ByteStream::from(body))
                .content_type(content_type)
                .send()
                .await
                .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))
        })
        .await?;

        info!("Uploaded s3://{}/{}", self.bucket, key);

        let presign = PresigningConfig::expires_in(self.url_ttl)
            .map_err(|e| AppError::Storage(format!("Invalid presigning config: {e}")))?;

        let url = self
            .bounded("S3 presign", async {
                self.client
                    .get_object()
                    .bucket(&self.bucket)
                    .key(&key)
                    .presigned(presign)
                    .await
                    .map(|req| req.uri().to_string())
                    .map_err(|e| AppError::Storage(format!("S3 presign failed: {e}")))
            })
            .await?;

        Ok(StoredObject { key, url })
    }

    async fn fetch(&self, key: &str) -> Result<Bytes, AppError> {
        self.bounded("S3 download", async {
            let object = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| AppError::Storage(format!("S3 download failed: {e}")))?;

            let data = object
                .body
                .collect()
                .await
                .map_err(|e| AppError::Storage(format!("S3 body read failed: {e}")))?;

            Ok(data.into_bytes())
        })
        .await
    }
}

/// `{folder}/{uuid}.{ext}` — a fresh UUID per upload, so keys never collide.
fn object_key(folder: &str, content_type: &str) -> String {
    format!(
        "{}/{}.{}",
        folder.trim_matches('/'),
        Uuid::new_v4(),
        extension_for(content_type)
    )
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "application/pdf" => "pdf",
        _ => "bin",
    }
}
