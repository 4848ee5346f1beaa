//! Request middleware

pub mod auth;

pub use auth::{auth_layer, require_admin, require_superadmin, CurrentUser, RoleGate};
