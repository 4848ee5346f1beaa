use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

use crate::entity::{document, user, DocumentType, Role};
use super::contains_pattern;
use crate::service::filter::DocumentFilter;

/// Listing projection: a document joined with its author's role
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    pub banner: Option<String>,
    pub cover: Option<String>,
    pub type_id: DocumentType,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
    pub author_role: Role,
}

#[derive(Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// One page of documents matching `filter`, newest first.
    /// `role` further restricts to documents authored by that role.
    pub async fn find_all(
        &self,
        filter: &DocumentFilter,
        role: Option<Role>,
    ) -> Result<Vec<DocumentRow>, DbErr> {
        let mut query = document::Entity::find()
            .select_only()
            .column(document::Column::Id)
            .column(document::Column::Title)
            .column(document::Column::Banner)
            .column(document::Column::Cover)
            .column(document::Column::TypeId)
            .column(document::Column::CreatedAt)
            .column(document::Column::UpdatedAt)
            .column_as(user::Column::RoleId, "author_role")
            .join(JoinType::InnerJoin, document::Relation::Author.def())
            .filter(document::Column::DeletedAt.is_null())
            .filter(document::Column::CreatedAt.between(filter.range.start, filter.range.end));

        if let Some(org) = filter.organization {
            query = query.filter(user::Column::RoleId.is_in(org.roles()));
        }
        if let Some(role) = role {
            query = query.filter(user::Column::RoleId.eq(role));
        }
        if let Some(doc_type) = filter.document_type {
            query = query.filter(document::Column::TypeId.eq(doc_type));
        }
        if !filter.title.is_empty() {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    document::Entity,
                    document::Column::Title,
                ))))
                .like(contains_pattern(&filter.title)),
            );
        }

        query
            .order_by_desc(document::Column::CreatedAt)
            .offset(filter.pagination.offset())
            .limit(filter.pagination.page_size)
            .into_model::<DocumentRow>()
            .all(&self.db)
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<document::Model>, DbErr> {
        document::Entity::find_by_id(id)
            .filter(document::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }

    /// Document together with its author
    pub async fn find_with_author(
        &self,
        id: &str,
    ) -> Result<Option<(document::Model, Option<user::Model>)>, DbErr> {
        document::Entity::find_by_id(id)
            .filter(document::Column::DeletedAt.is_null())
            .find_also_related(user::Entity)
            .one(&self.db)
            .await
    }

    pub async fn id_taken(&self, id: &str) -> Result<bool, DbErr> {
        Ok(document::Entity::find_by_id(id).one(&self.db).await?.is_some())
    }

    pub async fn insert(&self, model: document::ActiveModel) -> Result<document::Model, DbErr> {
        model.insert(&self.db).await
    }

    pub async fn update(&self, model: document::ActiveModel) -> Result<document::Model, DbErr> {
        model.update(&self.db).await
    }

    pub async fn soft_delete(&self, id: &str) -> Result<bool, DbErr> {
        let result = document::Entity::update_many()
            .col_expr(document::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(document::Column::Id.eq(id))
            .filter(document::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
