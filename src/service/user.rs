//! User administration and self-service profile updates
//!
//! A superadmin manages exactly one role, the admin role of its own
//! organization: it creates users with that role and may only read, update
//! or delete users holding it.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;

use super::auth::hash_password;
use super::filter::Pagination;
use super::present;
use crate::entity::user::{self, UserResponse};
use crate::entity::Role;
use crate::error::{AppError, AppResult, OptionExt};
use crate::repository::UserRepository;

const MAX_USER_ID_LEN: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    /// Accepted for compatibility; the stored role always follows the creator
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

/// Fields to overwrite on a user; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    first_name: Option<String>,
    last_name: Option<String>,
    password_hash: Option<String>,
}

impl UserPatch {
    /// Build from a request, hashing a new password when one is given
    pub fn from_request(req: UpdateUserRequest) -> AppResult<Self> {
        let password_hash = match present(req.password) {
            Some(password) => Some(hash_password(&password)?),
            None => None,
        };

        Ok(Self {
            first_name: present(req.first_name),
            last_name: present(req.last_name),
            password_hash,
        })
    }

    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.password_hash.is_none()
    }

    /// Active model with the present fields set and `updated_at` stamped
    pub fn apply(self, model: user::Model) -> user::ActiveModel {
        let mut active: user::ActiveModel = model.into();
        if let Some(first_name) = self.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = self.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(password) = self.password_hash {
            active.password = Set(password);
        }
        active.updated_at = Set(Utc::now());
        active
    }
}

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    pub async fn get_all(
        &self,
        actor: &user::Model,
        pagination: Pagination,
    ) -> AppResult<Vec<UserResponse>> {
        let role = managed_role(actor)?;
        let users = self.users.find_all_by_role(role, pagination).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_by_id(&self, actor: &user::Model, user_id: &str) -> AppResult<UserResponse> {
        let target = self.managed_user(actor, user_id).await?;
        Ok(target.into())
    }

    pub async fn create(
        &self,
        actor: &user::Model,
        req: CreateUserRequest,
    ) -> AppResult<UserResponse> {
        let role = managed_role(actor)?;

        if req.id.is_empty()
            || req.first_name.is_empty()
            || req.last_name.is_empty()
            || req.password.is_empty()
        {
            return Err(AppError::bad_request(
                "id, first_name, last_name and password are required",
            ));
        }
        if req.id.chars().count() > MAX_USER_ID_LEN {
            return Err(AppError::bad_request(format!(
                "user id must be at most {} characters",
                MAX_USER_ID_LEN
            )));
        }

        if self.users.id_taken(&req.id).await? {
            tracing::warn!("Create user rejected, {} already exists", req.id);
            return Err(AppError::bad_request("user already exists"));
        }

        let now = Utc::now();
        let created = self
            .users
            .insert(user::ActiveModel {
                id: Set(req.id),
                first_name: Set(req.first_name),
                last_name: Set(req.last_name),
                password: Set(hash_password(&req.password)?),
                role_id: Set(role),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            })
            .await?;

        tracing::info!("User {} created by {} with role {}", created.id, actor.id, role);
        Ok(created.into())
    }

    pub async fn update_by_id(
        &self,
        actor: &user::Model,
        user_id: &str,
        req: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        let patch = UserPatch::from_request(req)?;
        if patch.is_empty() {
            return Err(AppError::bad_request("No fields to update"));
        }

        let target = self.managed_user(actor, user_id).await?;
        let updated = self.users.update(patch.apply(target)).await?;

        tracing::info!("User {} updated by {}", updated.id, actor.id);
        Ok(updated.into())
    }

    pub async fn delete_by_id(&self, actor: &user::Model, user_id: &str) -> AppResult<()> {
        self.managed_user(actor, user_id).await?;
        if !self.users.soft_delete(user_id).await? {
            return Err(AppError::not_found("user not found"));
        }

        tracing::info!("User {} deleted by {}", user_id, actor.id);
        Ok(())
    }

    /// Self-service update of the caller's own record
    pub async fn update_profile(
        &self,
        actor: &user::Model,
        req: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        let patch = UserPatch::from_request(req)?;
        if patch.is_empty() {
            return Err(AppError::bad_request("No fields to update"));
        }

        let updated = self.users.update(patch.apply(actor.clone())).await?;
        tracing::info!("User {} updated own profile", updated.id);
        Ok(updated.into())
    }

    async fn managed_user(&self, actor: &user::Model, user_id: &str) -> AppResult<user::Model> {
        let role = managed_role(actor)?;
        let target = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("user not found")?;

        if target.role_id != role {
            tracing::warn!(
                "{} ({}) may not manage {} ({})",
                actor.id,
                actor.role_id,
                target.id,
                target.role_id
            );
            return Err(AppError::forbidden("invalid role"));
        }
        Ok(target)
    }
}

fn managed_role(actor: &user::Model) -> AppResult<Role> {
    actor.role_id.managed_role().ok_or_else(|| {
        tracing::warn!("{} with role {} cannot manage users", actor.id, actor.role_id);
        AppError::forbidden("invalid role")
    })
}
