//! Attachment handlers
//!
//! Uploads are read field by field; each file is buffered in memory up to
//! the per-file cap before it is handed to the ingestion service.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::BytesMut;
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::routes::ApiResponse;
use crate::service::attachment::{AttachmentSummary, UploadedFile, MAX_FILE_SIZE};
use crate::service::filter::AttachmentListParams;
use crate::service::PaginationResponse;
use crate::state::AppState;

type Listing = Json<ApiResponse<PaginationResponse<AttachmentSummary>>>;

/// GET /api/v1/attachments
pub async fn get_all_attachments(
    State(state): State<AppState>,
    Query(params): Query<AttachmentListParams>,
) -> AppResult<Listing> {
    let filter = params.validate()?;
    let page = state.attachments.get_all(&filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/v1/attachments/role/:role_id
pub async fn get_attachments_by_role(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    Query(params): Query<AttachmentListParams>,
) -> AppResult<Listing> {
    let filter = params.validate()?;
    let page = state.attachments.get_all_by_role(&role_id, &filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// POST /api/v1/attachments/:document_id
pub async fn create_attachments(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<AttachmentSummary>>>)> {
    let mut files: BTreeMap<String, Vec<UploadedFile>> = BTreeMap::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        AppError::bad_request(format!("invalid multipart body: {}", e))
    })? {
        // Plain form values carry no file name
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let field_name = field.name().unwrap_or("file").to_string();
        let content_type = field.content_type().map(str::to_string);

        let mut buf = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| {
            tracing::warn!("Failed to read chunk of {}: {}", file_name, e);
            AppError::bad_request(format!("failed to read {}: {}", file_name, e))
        })? {
            if buf.len() + chunk.len() > MAX_FILE_SIZE {
                tracing::warn!("Upload rejected: {} exceeds {} bytes", file_name, MAX_FILE_SIZE);
                return Err(AppError::bad_request("file size exceeds the allowed limit"));
            }
            buf.extend_from_slice(&chunk);
        }

        files.entry(field_name).or_default().push(UploadedFile {
            file_name,
            content_type,
            bytes: buf.freeze(),
        });
    }

    let created = state.attachments.create(&document_id, &files).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// DELETE /api/v1/attachments/:attachment_id
pub async fn delete_attachment(
    State(state): State<AppState>,
    Path(attachment_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.attachments.delete(&attachment_id).await?;
    Ok(Json(ApiResponse::empty()))
}
