//! Attachment entity
//!
//! Table: attachments. The identifier doubles as the object storage key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::AttachmentType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    /// Storage key
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(255))")]
    pub id: String,

    /// Original file name
    #[sea_orm(column_type = "String(Some(255))")]
    pub display_name: String,

    #[sea_orm(column_type = "String(Some(100))")]
    pub document_id: String,

    pub type_id: AttachmentType,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::document::Entity",
        from = "Column::DocumentId",
        to = "super::document::Column::Id"
    )]
    Document,
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
