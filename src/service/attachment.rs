//! Attachment listing and ingestion
//!
//! Every file of a request is validated and staged before anything is
//! uploaded. Uploads then run in order and the rows are inserted once all of
//! them succeeded; files already uploaded are kept when a later step fails.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::Set;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::filter::AttachmentFilter;
use super::PaginationResponse;
use crate::entity::{attachment, AttachmentType, Role};
use crate::error::{AppError, AppResult, OptionExt};
use crate::repository::{AttachmentRepository, AttachmentRow, DocumentRepository};
use crate::storage::ObjectStore;

/// Per-file upload cap (32 MiB)
pub const MAX_FILE_SIZE: usize = 32 * 1024 * 1024;

pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".tiff", ".svg",
];

pub const DOCS_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt", ".xls", ".xlsx", ".csv", ".ppt", ".pptx",
    ".md", ".markdown",
];

const KEY_SUFFIX_LEN: usize = 8;

/// One file from a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentSummary {
    pub id: String,
    pub display_name: String,
    pub document_id: String,
    #[serde(rename = "type")]
    pub attachment_type: AttachmentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Lower-cased author role, only on role-scoped listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_role: Option<String>,
}

impl AttachmentSummary {
    fn from_row(row: AttachmentRow, with_role: bool) -> Self {
        Self {
            id: row.id,
            display_name: row.display_name,
            document_id: row.document_id,
            attachment_type: row.type_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            author_role: with_role.then(|| row.author_role.as_str().to_lowercase()),
        }
    }
}

/// Extension including the dot, lower-cased
fn extension(file_name: &str) -> Option<String> {
    let dot = file_name.rfind('.')?;
    Some(file_name[dot..].to_ascii_lowercase())
}

/// Attachment type for a file name, by extension
pub fn classify(file_name: &str) -> Option<AttachmentType> {
    let ext = extension(file_name)?;
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(AttachmentType::Image)
    } else if DOCS_EXTENSIONS.contains(&ext.as_str()) {
        Some(AttachmentType::Docs)
    } else {
        None
    }
}

/// `report.pdf` becomes `report-<8 digits>.pdf`
pub fn storage_key(file_name: &str) -> Option<String> {
    let dot = file_name.rfind('.')?;
    let (stem, ext) = file_name.split_at(dot);
    let mut rng = rand::thread_rng();
    let suffix: String = (0..KEY_SUFFIX_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    Some(format!("{}-{}{}", stem, suffix, ext))
}

#[derive(Clone)]
pub struct AttachmentService {
    attachments: AttachmentRepository,
    documents: DocumentRepository,
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl AttachmentService {
    pub fn new(
        attachments: AttachmentRepository,
        documents: DocumentRepository,
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            attachments,
            documents,
            store,
            bucket: bucket.into(),
        }
    }

    pub async fn get_all(
        &self,
        filter: &AttachmentFilter,
    ) -> AppResult<PaginationResponse<AttachmentSummary>> {
        let rows = self.attachments.find_all(filter, None).await?;
        let data = rows
            .into_iter()
            .map(|row| AttachmentSummary::from_row(row, false))
            .collect();
        Ok(PaginationResponse::new(data, filter.pagination))
    }

    /// Listing restricted to attachments of documents authored by `role`
    pub async fn get_all_by_role(
        &self,
        role: &str,
        filter: &AttachmentFilter,
    ) -> AppResult<PaginationResponse<AttachmentSummary>> {
        let role: Role = role
            .parse()
            .map_err(|_| AppError::bad_request("invalid role"))?;
        let rows = self.attachments.find_all(filter, Some(role)).await?;
        let data = rows
            .into_iter()
            .map(|row| AttachmentSummary::from_row(row, true))
            .collect();
        Ok(PaginationResponse::new(data, filter.pagination))
    }

    /// Validate, upload and record every file of one request
    pub async fn create(
        &self,
        document_id: &str,
        files: &BTreeMap<String, Vec<UploadedFile>>,
    ) -> AppResult<Vec<AttachmentSummary>> {
        self.documents
            .find_by_id(document_id)
            .await?
            .ok_or_not_found("document not found")?;

        let mut staged = Vec::new();
        for file in files.values().flatten() {
            if file.bytes.len() > MAX_FILE_SIZE {
                return Err(AppError::bad_request("file size exceeds the allowed limit"));
            }

            let attachment_type = classify(&file.file_name).ok_or_else(|| {
                AppError::bad_request(format!(
                    "invalid file type for {}: unsupported file extension",
                    file.file_name
                ))
            })?;

            // Classified names always carry an extension
            let key = storage_key(&file.file_name).ok_or_else(|| {
                AppError::bad_request(format!(
                    "invalid file type for {}: missing file extension",
                    file.file_name
                ))
            })?;

            staged.push((key, attachment_type, file));
        }

        if staged.is_empty() {
            return Err(AppError::bad_request("no file uploaded"));
        }

        for (key, _, file) in &staged {
            self.store
                .upload(
                    &self.bucket,
                    key,
                    file.bytes.clone(),
                    file.content_type.as_deref(),
                )
                .await
                .map_err(|e| {
                    tracing::error!("Upload of {} for document {} failed: {}", key, document_id, e);
                    e
                })?;
        }

        let now = Utc::now();
        let models: Vec<attachment::ActiveModel> = staged
            .iter()
            .map(|(key, attachment_type, file)| attachment::ActiveModel {
                id: Set(key.clone()),
                display_name: Set(file.file_name.clone()),
                document_id: Set(document_id.to_string()),
                type_id: Set(*attachment_type),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            })
            .collect();

        self.attachments.insert_many(models).await.map_err(|e| {
            tracing::error!("Insert of attachments for document {} failed: {}", document_id, e);
            e
        })?;

        let created: Vec<AttachmentSummary> = staged
            .into_iter()
            .map(|(key, attachment_type, file)| AttachmentSummary {
                id: key,
                display_name: file.file_name.clone(),
                document_id: document_id.to_string(),
                attachment_type,
                created_at: now,
                updated_at: now,
                author_role: None,
            })
            .collect();

        tracing::info!("{} attachment(s) added to document {}", created.len(), document_id);
        Ok(created)
    }

    /// Remove the attachment record; the stored object is kept
    pub async fn delete(&self, attachment_id: &str) -> AppResult<()> {
        if !self.attachments.soft_delete(attachment_id).await? {
            return Err(AppError::not_found("attachment not found"));
        }
        tracing::info!("Attachment {} deleted", attachment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_test_db;
    use crate::entity::DocumentType;
    use crate::repository::document::tests::new_document;
    use crate::repository::user::tests::new_user;
    use crate::repository::UserRepository;
    use crate::service::filter::AttachmentListParams;
    use crate::storage::{MemoryObjectStore, StorageError};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BUCKET: &str = "test-bucket";

    struct Fixture {
        service: AttachmentService,
        attachments: AttachmentRepository,
        documents: DocumentRepository,
        store: Arc<MemoryObjectStore>,
    }

    /// Memory store whose `fail_on`-th upload (1-based) errors
    struct FailingStore {
        inner: MemoryObjectStore,
        uploads: AtomicUsize,
        fail_on: usize,
    }

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn upload(
            &self,
            bucket: &str,
            key: &str,
            content: Bytes,
            content_type: Option<&str>,
        ) -> Result<(), StorageError> {
            if self.uploads.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(StorageError::Upload {
                    key: key.to_string(),
                    message: "connection reset".to_string(),
                });
            }
            self.inner.upload(bucket, key, content, content_type).await
        }

        async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
            self.inner.download(bucket, key, dest).await
        }

        async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
            self.inner.delete(bucket, key).await
        }
    }

    async fn fixture() -> Fixture {
        let db = connect_test_db().await;
        UserRepository::new(db.clone())
            .insert(new_user("6500000001", Role::SgcuAdmin))
            .await
            .unwrap();
        let documents = DocumentRepository::new(db.clone());
        documents
            .insert(new_document("DOC-00000001", "Budget", "6500000001", DocumentType::Budget))
            .await
            .unwrap();

        let attachments = AttachmentRepository::new(db);
        let store = Arc::new(MemoryObjectStore::new());
        Fixture {
            service: AttachmentService::new(
                attachments.clone(),
                documents.clone(),
                store.clone(),
                BUCKET,
            ),
            attachments,
            documents,
            store,
        }
    }

    fn files(list: &[(&str, usize)]) -> BTreeMap<String, Vec<UploadedFile>> {
        let uploaded = list
            .iter()
            .map(|(name, size)| UploadedFile {
                file_name: name.to_string(),
                content_type: None,
                bytes: Bytes::from(vec![b'x'; *size]),
            })
            .collect();
        BTreeMap::from([("file".to_string(), uploaded)])
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("photo.JPG"), Some(AttachmentType::Image));
        assert_eq!(classify("diagram.svg"), Some(AttachmentType::Image));
        assert_eq!(classify("report.pdf"), Some(AttachmentType::Docs));
        assert_eq!(classify("notes.Markdown"), Some(AttachmentType::Docs));
        assert_eq!(classify("archive.tar.gz"), None);
        assert_eq!(classify("README"), None);
    }

    #[test]
    fn test_storage_key_keeps_name_and_extension() {
        let key = storage_key("annual.report.pdf").unwrap();
        assert!(key.starts_with("annual.report-"));
        assert!(key.ends_with(".pdf"));
        let suffix = &key["annual.report-".len()..key.len() - ".pdf".len()];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
        assert!(storage_key("noext").is_none());
    }

    #[tokio::test]
    async fn test_upload_report_pdf() {
        let f = fixture().await;
        let created = f
            .service
            .create("DOC-00000001", &files(&[("report.pdf", 5 * 1024)]))
            .await
            .unwrap();

        assert_eq!(created.len(), 1);
        assert!(created[0].id.ends_with(".pdf"));
        assert_eq!(created[0].display_name, "report.pdf");

        let rows = f.attachments.find_by_document("DOC-00000001").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].type_id, AttachmentType::Docs);
        assert_eq!(rows[0].id, created[0].id);
        assert!(f.store.contains(BUCKET, &created[0].id));
    }

    #[tokio::test]
    async fn test_oversize_file_rejected_before_upload() {
        let f = fixture().await;
        let err = f
            .service
            .create(
                "DOC-00000001",
                &files(&[("small.png", 10), ("huge.pdf", MAX_FILE_SIZE + 1)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(f.store.is_empty());
        assert!(f.attachments.find_by_document("DOC-00000001").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_extension_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .create("DOC-00000001", &files(&[("photo.png", 10), ("tool.exe", 10)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("tool.exe")));
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_earlier_objects_and_inserts_nothing() {
        let f = fixture().await;
        let store = Arc::new(FailingStore {
            inner: MemoryObjectStore::new(),
            uploads: AtomicUsize::new(0),
            fail_on: 3,
        });
        let service = AttachmentService::new(
            f.attachments.clone(),
            f.documents.clone(),
            store.clone(),
            BUCKET,
        );

        let err = service
            .create(
                "DOC-00000001",
                &files(&[("a.png", 4), ("b.pdf", 4), ("c.pdf", 4), ("d.txt", 4)]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(StorageError::Upload { .. })));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.uploads.load(Ordering::SeqCst), 3);
        assert_eq!(store.inner.len(), 2);
        assert!(f.attachments.find_by_document("DOC-00000001").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_document() {
        let f = fixture().await;
        let err = f
            .service
            .create("DOC-99999999", &files(&[("report.pdf", 10)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_types_follow_extensions() {
        let f = fixture().await;
        let created = f
            .service
            .create(
                "DOC-00000001",
                &files(&[("a.PNG", 1), ("b.docx", 1), ("c.csv", 1), ("d.webp", 1)]),
            )
            .await
            .unwrap();
        let types: Vec<AttachmentType> = created.iter().map(|a| a.attachment_type).collect();
        assert_eq!(
            types,
            vec![
                AttachmentType::Image,
                AttachmentType::Docs,
                AttachmentType::Docs,
                AttachmentType::Image
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_keeps_stored_object() {
        let f = fixture().await;
        let created = f
            .service
            .create("DOC-00000001", &files(&[("report.pdf", 64)]))
            .await
            .unwrap();
        let key = created[0].id.clone();

        f.service.delete(&key).await.unwrap();
        assert!(f.attachments.find_by_id(&key).await.unwrap().is_none());

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("report.pdf");
        f.store.download(BUCKET, &key, &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap().len(), 64);

        assert!(matches!(
            f.service.delete(&key).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_listing_and_by_role() {
        let f = fixture().await;
        f.service
            .create("DOC-00000001", &files(&[("a.png", 1), ("b.pdf", 1)]))
            .await
            .unwrap();

        let filter = AttachmentListParams {
            attachment_type: Some("image".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let page = f.service.get_all(&filter).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total_pages, "1");

        let all = AttachmentListParams::default().validate().unwrap();
        let page = f.service.get_all_by_role("SGCU_ADMIN", &all).await.unwrap();
        assert_eq!(page.data.len(), 2);
        assert!(page
            .data
            .iter()
            .all(|a| a.author_role.as_deref() == Some("sgcu_admin")));

        let page = f.service.get_all_by_role("sccu_admin", &all).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_pages, "0");
    }
}
