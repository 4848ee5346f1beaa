//! Authentication middleware
//!
//! Resolves the bearer token to a user and gates routes by role

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::ops::Deref;

use crate::entity::{user, Role};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Extension holding the authenticated caller
#[derive(Clone, Debug)]
pub struct CurrentUser(pub user::Model);

impl Deref for CurrentUser {
    type Target = user::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Role checks applied after authentication
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleGate {
    /// SGCU admin or superadmin
    SgcuAdmin,
    SgcuSuperAdmin,
    /// SCCU admin or superadmin
    SccuAdmin,
    SccuSuperAdmin,
}

impl RoleGate {
    pub fn permits(&self, role: Role) -> bool {
        match self {
            RoleGate::SgcuAdmin => matches!(role, Role::SgcuAdmin | Role::SgcuSuperadmin),
            RoleGate::SgcuSuperAdmin => role == Role::SgcuSuperadmin,
            RoleGate::SccuAdmin => matches!(role, Role::SccuAdmin | Role::SccuSuperadmin),
            RoleGate::SccuSuperAdmin => role == Role::SccuSuperadmin,
        }
    }
}

const ANY_ADMIN: &[RoleGate] = &[RoleGate::SgcuAdmin, RoleGate::SccuAdmin];
const ANY_SUPERADMIN: &[RoleGate] = &[RoleGate::SgcuSuperAdmin, RoleGate::SccuSuperAdmin];

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
}

/// Authentication middleware
pub async fn auth_layer(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> AppResult<Response> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        AppError::unauthorized("missing or malformed authorization header")
    })?;

    let user = state.auth.resolve(&token).await?;
    tracing::debug!("Authenticated {} ({})", user.id, user.role_id);

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn check_gates(request: &Request<Body>, gates: &[RoleGate]) -> AppResult<()> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::unauthorized("authentication required"))?;

    if gates.iter().any(|gate| gate.permits(user.role_id)) {
        Ok(())
    } else {
        tracing::warn!(
            "Forbidden: {} ({}) on {} {}",
            user.id,
            user.role_id,
            request.method(),
            request.uri().path()
        );
        Err(AppError::forbidden("permission denied"))
    }
}

/// Admin or superadmin of either organization
pub async fn require_admin(request: Request<Body>, next: Next) -> AppResult<Response> {
    check_gates(&request, ANY_ADMIN)?;
    Ok(next.run(request).await)
}

/// Superadmin of either organization
pub async fn require_superadmin(request: Request<Body>, next: Next) -> AppResult<Response> {
    check_gates(&request, ANY_SUPERADMIN)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_role_gates() {
        assert!(RoleGate::SgcuAdmin.permits(Role::SgcuAdmin));
        assert!(RoleGate::SgcuAdmin.permits(Role::SgcuSuperadmin));
        assert!(!RoleGate::SgcuAdmin.permits(Role::SccuAdmin));
        assert!(RoleGate::SgcuSuperAdmin.permits(Role::SgcuSuperadmin));
        assert!(!RoleGate::SgcuSuperAdmin.permits(Role::SgcuAdmin));
        assert!(RoleGate::SccuAdmin.permits(Role::SccuSuperadmin));
        assert!(!RoleGate::SccuSuperAdmin.permits(Role::SgcuSuperadmin));
    }

    #[test]
    fn test_gate_sets() {
        use sea_orm::Iterable;
        for role in Role::iter() {
            assert!(ANY_ADMIN.iter().any(|g| g.permits(role)));
            assert_eq!(
                ANY_SUPERADMIN.iter().any(|g| g.permits(role)),
                role.is_superadmin()
            );
        }
    }
}
