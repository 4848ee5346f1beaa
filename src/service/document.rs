//! Document publishing: filtered listings, detail view and CRUD

use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use super::filter::DocumentFilter;
use super::{present, PaginationResponse};
use crate::entity::user::UserResponse;
use crate::entity::{attachment, document, user, AttachmentType, DocumentType, Organization, Role};
use crate::error::{AppError, AppResult, OptionExt};
use crate::repository::{AttachmentRepository, DocumentRepository, DocumentRow, UserRepository};

const DOCUMENT_ID_PREFIX: &str = "DOC-";
const ID_ATTEMPTS: usize = 5;

/// Listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub banner: Option<String>,
    pub cover: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub organization: Organization,
    /// Lower-cased author role, only on role-scoped listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_role: Option<String>,
}

impl DocumentSummary {
    fn from_row(row: DocumentRow, with_role: bool) -> Self {
        Self {
            id: row.id,
            title: row.title,
            banner: row.banner,
            cover: row.cover,
            doc_type: row.type_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            organization: row.author_role.organization(),
            author_role: with_role.then(|| row.author_role.as_str().to_lowercase()),
        }
    }
}

/// Attachment as embedded in a document detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentAttachment {
    pub id: String,
    pub display_name: String,
    pub document_id: String,
    #[serde(rename = "type")]
    pub attachment_type: AttachmentType,
    pub organization: Organization,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full document with its author and attachments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentDetail {
    pub id: String,
    pub title: String,
    pub content: String,
    pub banner: Option<String>,
    pub cover: Option<String>,
    pub user_id: String,
    pub type_id: DocumentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: UserResponse,
    pub images: Vec<DocumentAttachment>,
    pub docs: Vec<DocumentAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    /// Owner; the caller when absent
    #[serde(default)]
    pub user_id: Option<String>,
    pub type_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub banner: Option<String>,
    pub cover: Option<String>,
}

/// Fields to overwrite on a document; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    title: Option<String>,
    content: Option<String>,
    banner: Option<String>,
    cover: Option<String>,
}

impl DocumentPatch {
    pub fn title(mut self, value: impl Into<String>) -> Self {
        self.title = Some(value.into());
        self
    }

    pub fn content(mut self, value: impl Into<String>) -> Self {
        self.content = Some(value.into());
        self
    }

    pub fn banner(mut self, value: impl Into<String>) -> Self {
        self.banner = Some(value.into());
        self
    }

    pub fn cover(mut self, value: impl Into<String>) -> Self {
        self.cover = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.banner.is_none() && self.cover.is_none()
    }

    pub fn apply(self, model: document::Model) -> document::ActiveModel {
        let mut active: document::ActiveModel = model.into();
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(content) = self.content {
            active.content = Set(content);
        }
        if let Some(banner) = self.banner {
            active.banner = Set(Some(banner));
        }
        if let Some(cover) = self.cover {
            active.cover = Set(Some(cover));
        }
        active.updated_at = Set(Utc::now());
        active
    }
}

impl From<UpdateDocumentRequest> for DocumentPatch {
    fn from(req: UpdateDocumentRequest) -> Self {
        Self {
            title: present(req.title),
            content: present(req.content),
            banner: present(req.banner),
            cover: present(req.cover),
        }
    }
}

#[derive(Clone)]
pub struct DocumentService {
    documents: DocumentRepository,
    users: UserRepository,
    attachments: AttachmentRepository,
}

impl DocumentService {
    pub fn new(
        documents: DocumentRepository,
        users: UserRepository,
        attachments: AttachmentRepository,
    ) -> Self {
        Self {
            documents,
            users,
            attachments,
        }
    }

    pub async fn get_all(
        &self,
        filter: &DocumentFilter,
    ) -> AppResult<PaginationResponse<DocumentSummary>> {
        let rows = self.documents.find_all(filter, None).await?;
        let data = rows
            .into_iter()
            .map(|row| DocumentSummary::from_row(row, false))
            .collect();
        Ok(PaginationResponse::new(data, filter.pagination))
    }

    /// Listing restricted to documents authored by `role`
    pub async fn get_all_by_role(
        &self,
        role: &str,
        filter: &DocumentFilter,
    ) -> AppResult<PaginationResponse<DocumentSummary>> {
        let role: Role = role
            .parse()
            .map_err(|_| AppError::bad_request("invalid role"))?;
        let rows = self.documents.find_all(filter, Some(role)).await?;
        let data = rows
            .into_iter()
            .map(|row| DocumentSummary::from_row(row, true))
            .collect();
        Ok(PaginationResponse::new(data, filter.pagination))
    }

    pub async fn get_by_id(&self, document_id: &str) -> AppResult<DocumentDetail> {
        let (doc, author) = self
            .documents
            .find_with_author(document_id)
            .await?
            .ok_or_not_found("document not found")?;
        let author = author.ok_or_else(|| {
            tracing::error!("Document {} has no author {}", doc.id, doc.user_id);
            AppError::internal("document author is missing")
        })?;

        let organization = author.role_id.organization();
        let (images, docs): (Vec<_>, Vec<_>) = self
            .attachments
            .find_by_document(&doc.id)
            .await?
            .into_iter()
            .map(|a| embed_attachment(a, organization))
            .partition(|a| a.attachment_type == AttachmentType::Image);

        Ok(DocumentDetail {
            id: doc.id,
            title: doc.title,
            content: doc.content,
            banner: doc.banner,
            cover: doc.cover,
            user_id: doc.user_id,
            type_id: doc.type_id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            author: author.into(),
            images,
            docs,
        })
    }

    pub async fn create(
        &self,
        actor: &user::Model,
        req: CreateDocumentRequest,
    ) -> AppResult<document::Model> {
        if req.title.trim().is_empty() || req.content.trim().is_empty() {
            return Err(AppError::bad_request("title and content are required"));
        }
        let doc_type: DocumentType = req
            .type_id
            .parse()
            .map_err(|_| AppError::bad_request(format!("invalid document type: {}", req.type_id)))?;

        let owner_id = present(req.user_id).unwrap_or_else(|| actor.id.clone());
        self.users
            .find_by_id(&owner_id)
            .await?
            .ok_or_not_found("user not found")?;

        let id = self.new_document_id().await?;
        let now = Utc::now();
        let created = self
            .documents
            .insert(document::ActiveModel {
                id: Set(id),
                title: Set(req.title),
                content: Set(req.content),
                banner: Set(present(req.banner)),
                cover: Set(present(req.cover)),
                user_id: Set(owner_id),
                type_id: Set(doc_type),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            })
            .await?;

        tracing::info!("Document {} created by {}", created.id, actor.id);
        Ok(created)
    }

    pub async fn update_by_id(
        &self,
        document_id: &str,
        patch: DocumentPatch,
    ) -> AppResult<document::Model> {
        if patch.is_empty() {
            return Err(AppError::bad_request("No fields to update"));
        }
        let existing = self
            .documents
            .find_by_id(document_id)
            .await?
            .ok_or_not_found("document not found")?;

        let updated = self.documents.update(patch.apply(existing)).await?;
        tracing::info!("Document {} updated", updated.id);
        Ok(updated)
    }

    pub async fn delete_by_id(&self, document_id: &str) -> AppResult<()> {
        if !self.documents.soft_delete(document_id).await? {
            return Err(AppError::not_found("document not found"));
        }
        tracing::info!("Document {} deleted", document_id);
        Ok(())
    }

    async fn new_document_id(&self) -> AppResult<String> {
        for _ in 0..ID_ATTEMPTS {
            let id = generate_document_id();
            if !self.documents.id_taken(&id).await? {
                return Ok(id);
            }
        }
        Err(AppError::internal("failed to allocate a document id"))
    }
}

fn embed_attachment(model: attachment::Model, organization: Organization) -> DocumentAttachment {
    DocumentAttachment {
        id: model.id,
        display_name: model.display_name,
        document_id: model.document_id,
        attachment_type: model.type_id,
        organization,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// `DOC-` followed by 8 random digits
pub fn generate_document_id() -> String {
    let mut rng = rand::thread_rng();
    let digits: String = (0..8)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    format!("{}{}", DOCUMENT_ID_PREFIX, digits)
}
