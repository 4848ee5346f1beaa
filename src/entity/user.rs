//! User entity
//!
//! Table: users. The identifier is the institutional (student) ID.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Student ID
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(10))")]
    pub id: String,

    #[sea_orm(column_type = "String(Some(100))")]
    pub first_name: String,

    #[sea_orm(column_type = "String(Some(100))")]
    pub last_name: String,

    /// bcrypt hash
    #[sea_orm(column_type = "String(Some(255))")]
    #[serde(skip_serializing)]
    pub password: String,

    pub role_id: Role,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    /// Soft-delete marker
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// User response (without password)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl From<Model> for UserResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            role: model.role_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
