//! Interview recordings in the object store.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3 error: {0}")]
    S3(String),
}

#[derive(Debug, Clone)]
pub struct Recording {
    pub bytes: Bytes,
    pub content_type: String,
    pub size: u64,
}

/// Object key of an interview's recording.
pub fn recording_key(interview_id: Uuid) -> String {
    format!("recordings/interview_{interview_id}.mp4")
}

#[async_trait]
pub trait RecordingStore: Send + Sync {
    /// `Ok(None)` when no recording exists for the interview.
    async fn fetch(&self, interview_id: Uuid) -> Result<Option<Recording>, StorageError>;
}

pub struct S3RecordingStore {
    client: S3Client,
    bucket: String,
}

impl S3RecordingStore {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl RecordingStore for S3RecordingStore {
    async fn fetch(&self, interview_id: Uuid) -> Result<Option<Recording>, StorageError> {
        let key = recording_key(interview_id);

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().map(|se| se.is_no_such_key()) == Some(true) {
                    return Ok(None);
                }
                return Err(StorageError::S3(format!("get_object {key} failed: {e}")));
            }
        };

        let content_type = output
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(format!("reading {key} failed: {e}")))?
            .into_bytes();

        debug!("Fetched s3://{}/{} ({} bytes)", self.bucket, key, bytes.len());

        Ok(Some(Recording {
            size: bytes.len() as u64,
            bytes,
            content_type,
        }))
    }
}
