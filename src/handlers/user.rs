//! User handlers
//!
//! Superadmin-only administration of the admins of the caller's organization

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::entity::user::UserResponse;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::routes::ApiResponse;
use crate::service::filter::PageParams;
use crate::service::user::{CreateUserRequest, UpdateUserRequest};
use crate::state::AppState;

/// GET /api/v1/users
pub async fn get_all_users(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let pagination = params.validate()?;
    let users = state.users.get_all(&actor, pagination).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /api/v1/users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state.users.get_by_id(&actor, &user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let created = state.users.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// PUT /api/v1/users/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let updated = state.users.update_by_id(&actor, &user_id, req).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/v1/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.users.delete_by_id(&actor, &user_id).await?;
    Ok(Json(ApiResponse::empty()))
}
