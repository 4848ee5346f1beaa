//! Closed enumerations shared by entities, services and handlers
//!
//! Roles, document types and attachment types are stored as their
//! upper-case code strings; organizations are derived from the role prefix.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Organizational unit owning users and documents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Organization {
    Sgcu,
    Sccu,
}

impl Organization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Organization::Sgcu => "sgcu",
            Organization::Sccu => "sccu",
        }
    }

    /// Both roles belonging to this organization
    pub fn roles(&self) -> [Role; 2] {
        match self {
            Organization::Sgcu => [Role::SgcuAdmin, Role::SgcuSuperadmin],
            Organization::Sccu => [Role::SccuAdmin, Role::SccuSuperadmin],
        }
    }
}

impl FromStr for Organization {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sgcu" => Ok(Organization::Sgcu),
            "sccu" => Ok(Organization::Sccu),
            _ => Err(UnknownVariant::new("organization", s)),
        }
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User role: an (organization, admin level) pair
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(100))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "SGCU_ADMIN")]
    SgcuAdmin,
    #[sea_orm(string_value = "SGCU_SUPERADMIN")]
    SgcuSuperadmin,
    #[sea_orm(string_value = "SCCU_ADMIN")]
    SccuAdmin,
    #[sea_orm(string_value = "SCCU_SUPERADMIN")]
    SccuSuperadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SgcuAdmin => "SGCU_ADMIN",
            Role::SgcuSuperadmin => "SGCU_SUPERADMIN",
            Role::SccuAdmin => "SCCU_ADMIN",
            Role::SccuSuperadmin => "SCCU_SUPERADMIN",
        }
    }

    pub fn organization(&self) -> Organization {
        match self {
            Role::SgcuAdmin | Role::SgcuSuperadmin => Organization::Sgcu,
            Role::SccuAdmin | Role::SccuSuperadmin => Organization::Sccu,
        }
    }

    pub fn is_superadmin(&self) -> bool {
        matches!(self, Role::SgcuSuperadmin | Role::SccuSuperadmin)
    }

    /// Role a superadmin creates and administers; `None` for plain admins
    pub fn managed_role(&self) -> Option<Role> {
        match self {
            Role::SgcuSuperadmin => Some(Role::SgcuAdmin),
            Role::SccuSuperadmin => Some(Role::SccuAdmin),
            Role::SgcuAdmin | Role::SccuAdmin => None,
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SGCU_ADMIN" => Ok(Role::SgcuAdmin),
            "SGCU_SUPERADMIN" => Ok(Role::SgcuSuperadmin),
            "SCCU_ADMIN" => Ok(Role::SccuAdmin),
            "SCCU_SUPERADMIN" => Ok(Role::SccuSuperadmin),
            _ => Err(UnknownVariant::new("role", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of published document
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(100))")]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[sea_orm(string_value = "ANNOUNCEMENT")]
    Announcement,
    #[sea_orm(string_value = "BUDGET")]
    Budget,
    #[sea_orm(string_value = "STATISTIC")]
    Statistic,
}

impl DocumentType {
    /// Stored code
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Announcement => "ANNOUNCEMENT",
            DocumentType::Budget => "BUDGET",
            DocumentType::Statistic => "STATISTIC",
        }
    }
}

impl FromStr for DocumentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ANNOUNCEMENT" => Ok(DocumentType::Announcement),
            "BUDGET" => Ok(DocumentType::Budget),
            "STATISTIC" => Ok(DocumentType::Statistic),
            _ => Err(UnknownVariant::new("document type", s)),
        }
    }
}

/// Attachment classification, derived from the file extension
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(100))")]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    #[sea_orm(string_value = "IMAGE")]
    Image,
    #[sea_orm(string_value = "DOCS")]
    Docs,
}

impl AttachmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentType::Image => "IMAGE",
            AttachmentType::Docs => "DOCS",
        }
    }
}

impl FromStr for AttachmentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IMAGE" => Ok(AttachmentType::Image),
            "DOCS" => Ok(AttachmentType::Docs),
            _ => Err(UnknownVariant::new("attachment type", s)),
        }
    }
}
