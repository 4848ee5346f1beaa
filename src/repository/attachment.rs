use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

use crate::entity::{attachment, document, user, AttachmentType, Role};
use super::contains_pattern;
use crate::service::filter::AttachmentFilter;

/// Listing projection: an attachment with the role of its document's author
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct AttachmentRow {
    pub id: String,
    pub display_name: String,
    pub document_id: String,
    pub type_id: AttachmentType,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
    pub author_role: Role,
}

#[derive(Clone)]
pub struct AttachmentRepository {
    db: DatabaseConnection,
}

impl AttachmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// One page of attachments matching `filter`, newest first.
    /// `role` restricts to attachments of documents authored by that role.
    pub async fn find_all(
        &self,
        filter: &AttachmentFilter,
        role: Option<Role>,
    ) -> Result<Vec<AttachmentRow>, DbErr> {
        let mut query = attachment::Entity::find()
            .select_only()
            .column(attachment::Column::Id)
            .column(attachment::Column::DisplayName)
            .column(attachment::Column::DocumentId)
            .column(attachment::Column::TypeId)
            .column(attachment::Column::CreatedAt)
            .column(attachment::Column::UpdatedAt)
            .column_as(user::Column::RoleId, "author_role")
            .join(JoinType::InnerJoin, attachment::Relation::Document.def())
            .join(JoinType::InnerJoin, document::Relation::Author.def())
            .filter(attachment::Column::DeletedAt.is_null())
            .filter(document::Column::DeletedAt.is_null())
            .filter(attachment::Column::CreatedAt.between(filter.range.start, filter.range.end));

        if let Some(role) = role {
            query = query.filter(user::Column::RoleId.eq(role));
        }
        if let Some(attachment_type) = filter.attachment_type {
            query = query.filter(attachment::Column::TypeId.eq(attachment_type));
        }
        if !filter.name.is_empty() {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    attachment::Entity,
                    attachment::Column::DisplayName,
                ))))
                .like(contains_pattern(&filter.name)),
            );
        }

        query
            .order_by_desc(attachment::Column::CreatedAt)
            .offset(filter.pagination.offset())
            .limit(filter.pagination.page_size)
            .into_model::<AttachmentRow>()
            .all(&self.db)
            .await
    }

    /// Live attachments of one document, oldest first
    pub async fn find_by_document(
        &self,
        document_id: &str,
    ) -> Result<Vec<attachment::Model>, DbErr> {
        attachment::Entity::find()
            .filter(attachment::Column::DocumentId.eq(document_id))
            .filter(attachment::Column::DeletedAt.is_null())
            .order_by_asc(attachment::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<attachment::Model>, DbErr> {
        attachment::Entity::find_by_id(id)
            .filter(attachment::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }

    pub async fn insert_many(&self, models: Vec<attachment::ActiveModel>) -> Result<(), DbErr> {
        if models.is_empty() {
            return Ok(());
        }
        attachment::Entity::insert_many(models).exec(&self.db).await?;
        Ok(())
    }

    pub async fn soft_delete(&self, id: &str) -> Result<bool, DbErr> {
        let result = attachment::Entity::update_many()
            .col_expr(attachment::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(attachment::Column::Id.eq(id))
            .filter(attachment::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
