//! Document entity
//!
//! Table: documents

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::DocumentType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// `DOC-` followed by 8 digits
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(100))")]
    pub id: String,

    #[sea_orm(column_type = "String(Some(255))")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Banner image reference
    #[sea_orm(column_type = "String(Some(255))", nullable)]
    pub banner: Option<String>,

    /// Cover image reference
    #[sea_orm(column_type = "String(Some(255))", nullable)]
    pub cover: Option<String>,

    /// Author (users.id)
    #[sea_orm(column_type = "String(Some(10))")]
    pub user_id: String,

    pub type_id: DocumentType,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Author,
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
