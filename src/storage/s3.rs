use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Builder, Credentials, Region},
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client,
};
use bytes::Bytes;
use std::path::Path;
use tracing::{debug, info};

use super::{ObjectStore, StorageError};
use crate::config::StorageConfig;

/// S3-compatible bucket client
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
            return Err(StorageError::Config(
                "access_key_id and secret_access_key are required".to_string(),
            ));
        }
        if config.region.is_empty() {
            return Err(StorageError::Config("region is required".to_string()));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "sucu-storage",
        );

        let mut builder = Builder::new()
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .behavior_version_latest();

        if let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.is_empty()) {
            info!("Using custom S3 endpoint: {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let size = content.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .set_content_type(content_type.map(str::to_string))
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        debug!("Uploaded {}/{} ({} bytes)", bucket, key, size);
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Download {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Download {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tokio::fs::write(dest, body.into_bytes()).await?;
        debug!("Downloaded {}/{} to {}", bucket, key, dest.display());
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        debug!("Deleted {}/{}", bucket, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;

    fn s3_config() -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::S3,
            bucket: "sucu".to_string(),
            region: "asia-southeast1".to_string(),
            endpoint: Some("https://storage.googleapis.com".to_string()),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_with_credentials() {
        assert!(S3ObjectStore::new(&s3_config()).is_ok());
    }

    #[test]
    fn test_new_requires_region() {
        let config = StorageConfig {
            region: String::new(),
            ..s3_config()
        };
        assert!(matches!(
            S3ObjectStore::new(&config),
            Err(StorageError::Config(_))
        ));
    }
}
