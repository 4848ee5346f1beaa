//! Document handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::entity::document;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::routes::ApiResponse;
use crate::service::document::{
    CreateDocumentRequest, DocumentDetail, DocumentSummary, UpdateDocumentRequest,
};
use crate::service::filter::DocumentListParams;
use crate::service::PaginationResponse;
use crate::state::AppState;

type Listing = Json<ApiResponse<PaginationResponse<DocumentSummary>>>;

/// GET /api/v1/documents
pub async fn get_all_documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentListParams>,
) -> AppResult<Listing> {
    let filter = params.validate()?;
    let page = state.documents.get_all(&filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/v1/documents/role/:role_id
pub async fn get_documents_by_role(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    Query(params): Query<DocumentListParams>,
) -> AppResult<Listing> {
    let filter = params.validate()?;
    let page = state.documents.get_all_by_role(&role_id, &filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/v1/documents/:document_id
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> AppResult<Json<ApiResponse<DocumentDetail>>> {
    let detail = state.documents.get_by_id(&document_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// POST /api/v1/documents
pub async fn create_document(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Json(req): Json<CreateDocumentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<document::Model>>)> {
    let created = state.documents.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// PUT /api/v1/documents/:document_id
pub async fn update_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(req): Json<UpdateDocumentRequest>,
) -> AppResult<Json<ApiResponse<document::Model>>> {
    let updated = state
        .documents
        .update_by_id(&document_id, req.into())
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/v1/documents/:document_id
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.documents.delete_by_id(&document_id).await?;
    Ok(Json(ApiResponse::empty()))
}
