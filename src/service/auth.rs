//! Login and bearer-token session resolution

use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::jwt;
use crate::repository::UserRepository;

#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        AppError::internal("failed to hash password")
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub student_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    pub async fn login(&self, req: &LoginRequest) -> AppResult<LoginResponse> {
        if req.student_id.is_empty() || req.password.is_empty() {
            return Err(AppError::bad_request("student_id and password are required"));
        }

        let user = self
            .users
            .find_by_id(&req.student_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Login failed: user not found - {}", req.student_id);
                AppError::not_found("this user is not found")
            })?;

        let password_valid = bcrypt::verify(&req.password, &user.password).map_err(|e| {
            tracing::error!("Stored password hash of {} is unreadable: {}", user.id, e);
            AppError::internal("failed to verify password")
        })?;
        if !password_valid {
            tracing::warn!("Login failed: wrong password - {}", req.student_id);
            return Err(AppError::unauthorized(
                "this given password is not match with existed password",
            ));
        }

        let access_token = jwt::sign_access_token(&user.id, &self.jwt).map_err(|e| {
            tracing::error!("Failed to sign token for {}: {}", user.id, e);
            AppError::internal("failed to sign access token")
        })?;

        tracing::info!("User logged in: {}", user.id);
        Ok(LoginResponse { access_token })
    }

    /// User behind a bearer token
    pub async fn resolve(&self, token: &str) -> AppResult<user::Model> {
        let claims = jwt::verify_access_token(token, &self.jwt).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AppError::unauthorized("invalid or expired token")
        })?;

        self.users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("token subject no longer exists"))
    }
}
