//! Authentication handlers
//!
//! Implements login and the caller's own profile

use axum::{extract::State, Extension, Json};

use crate::entity::user::UserResponse;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::routes::ApiResponse;
use crate::service::auth::{LoginRequest, LoginResponse};
use crate::service::user::UpdateUserRequest;
use crate::state::AppState;

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let res = state.auth.login(&req).await?;
    Ok(Json(ApiResponse::success(res)))
}

/// GET /api/v1/auth/me
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::success(user.0.into()))
}

/// PUT /api/v1/auth/me
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let updated = state.users.update_profile(&user, req).await?;
    Ok(Json(ApiResponse::success(updated)))
}
