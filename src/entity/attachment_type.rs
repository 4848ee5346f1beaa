//! Lookup table for [`AttachmentType`](super::AttachmentType) codes
//!
//! Table: attachment_types

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachment_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(100))")]
    pub id: String,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
