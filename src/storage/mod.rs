//! Object storage for attachment content
//!
//! Attachments are addressed by bucket and key. The S3 backend talks to any
//! S3-compatible provider; the memory backend keeps objects in process and
//! backs local development and tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

pub mod memory;
pub mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("download of {key} failed: {message}")]
    Download { key: String, message: String },

    #[error("delete of {key} failed: {message}")]
    Delete { key: String, message: String },

    #[error("invalid storage configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Upload / download / delete by bucket and key
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `content` under `key`; `content_type` becomes the object's MIME type when given
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Write the object's content to `dest`, replacing any existing file
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError>;

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}

/// Build the store selected by the configuration
pub fn build(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::S3 => {
            let store = S3ObjectStore::new(config)?;
            tracing::info!("Using S3 object storage, bucket {}", config.bucket);
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory object storage; uploaded files are lost on restart");
            Ok(Arc::new(MemoryObjectStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_memory_backend() {
        let config = StorageConfig::default();
        assert!(build(&config).is_ok());
    }

    #[test]
    fn test_build_s3_requires_credentials() {
        let config = StorageConfig {
            backend: StorageBackend::S3,
            region: "us-east-1".to_string(),
            ..Default::default()
        };
        assert!(matches!(build(&config), Err(StorageError::Config(_))));
    }
}
