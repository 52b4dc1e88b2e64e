//! Attachment persistence for scanned emails.
//!
//! Attachments are uploaded optimistically during a scan — before the user
//! confirms anything — so the frontend can show retrieval links immediately.
//! Discarding a scanned email is expected to delete them again; that cleanup
//! is best-effort and failures are logged rather than surfaced.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use thiserror::Error;
use tracing::info;

/// All scanned attachments live under one key prefix in the user-documents
/// bucket, keyed by sanitized filename. Same-name uploads overwrite.
const ATTACHMENT_PREFIX: &str = "email_attachments";

/// Lifetime of the presigned retrieval URL handed to the frontend.
const SIGNED_URL_TTL: Duration = Duration::from_secs(20 * 60);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("attachment upload failed: {0}")]
    Upload(String),

    #[error("attachment delete failed: {0}")]
    Delete(String),

    #[error("presigning failed: {0}")]
    Presign(String),
}

/// Object storage seam for scanned attachments. Production uses S3/MinIO;
/// tests substitute an in-memory store.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Persists one attachment and returns a time-limited retrieval URL.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, StorageError>;

    async fn delete(&self, file_name: &str) -> Result<(), StorageError>;
}

pub struct S3AttachmentStore {
    s3: aws_sdk_s3::Client,
    bucket: String,
}

impl S3AttachmentStore {
    pub fn new(s3: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { s3, bucket }
    }

    fn key(file_name: &str) -> String {
        format!("{ATTACHMENT_PREFIX}/{file_name}")
    }
}

#[async_trait]
impl AttachmentStore for S3AttachmentStore {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let key = Self::key(file_name);

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let presigning = PresigningConfig::expires_in(SIGNED_URL_TTL)
            .map_err(|e| StorageError::Presign(e.to_string()))?;
        let request = self
            .s3
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        info!("Uploaded scanned attachment to s3://{}/{}", self.bucket, key);
        Ok(request.uri().to_string())
    }

    async fn delete(&self, file_name: &str) -> Result<(), StorageError> {
        let key = Self::key(file_name);

        self.s3
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        info!("Deleted scanned attachment s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
