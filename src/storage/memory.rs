use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::path::Path;

use super::{ObjectStore, StorageError};

/// In-process object store keyed by (bucket, key)
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<(String, String), Bytes>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content: Bytes,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.objects
            .insert((bucket.to_string(), key.to_string()), content);
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        // Clone out of the map so no shard lock is held across the write
        let content = self
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;

        tokio::fs::write(dest, &content).await?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.objects.remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_download() {
        let store = MemoryObjectStore::new();
        store
            .upload(
                "bucket",
                "report-12345678.pdf",
                Bytes::from_static(b"%PDF-1.4"),
                Some("application/pdf"),
            )
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("report.pdf");
        store
            .download("bucket", "report-12345678.pdf", &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_download_missing_object() {
        let store = MemoryObjectStore::new();
        let dir = tempfile::tempdir().unwrap();
        let result = store
            .download("bucket", "missing.png", &dir.path().join("out"))
            .await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_buckets_are_separate() {
        let store = MemoryObjectStore::new();
        store
            .upload("a", "key.txt", Bytes::from_static(b"x"), None)
            .await
            .unwrap();
        assert!(store.contains("a", "key.txt"));
        assert!(!store.contains("b", "key.txt"));

        store.delete("a", "key.txt").await.unwrap();
        assert!(store.is_empty());
    }
}
