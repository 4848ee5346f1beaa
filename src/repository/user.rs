use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entity::{user, Role};
use crate::service::filter::Pagination;

#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }

    /// Whether the ID is taken, soft-deleted rows included
    pub async fn id_taken(&self, id: &str) -> Result<bool, DbErr> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?.is_some())
    }

    pub async fn find_all_by_role(
        &self,
        role: Role,
        pagination: Pagination,
    ) -> Result<Vec<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::RoleId.eq(role))
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.page_size)
            .all(&self.db)
            .await
    }

    pub async fn insert(&self, model: user::ActiveModel) -> Result<user::Model, DbErr> {
        model.insert(&self.db).await
    }

    pub async fn update(&self, model: user::ActiveModel) -> Result<user::Model, DbErr> {
        model.update(&self.db).await
    }

    /// Returns false when no live user has this ID
    pub async fn soft_delete(&self, id: &str) -> Result<bool, DbErr> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::connect_test_db;
    use sea_orm::Set;

    pub(crate) fn new_user(id: &str, role: Role) -> user::ActiveModel {
        let now = Utc::now();
        user::ActiveModel {
            id: Set(id.to_string()),
            first_name: Set("First".to_string()),
            last_name: Set("Last".to_string()),
            password: Set("hash".to_string()),
            role_id: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }

    #[tokio::test]
    async fn test_soft_delete_hides_user() {
        let repo = UserRepository::new(connect_test_db().await);
        repo.insert(new_user("6500000001", Role::SgcuAdmin)).await.unwrap();

        assert!(repo.soft_delete("6500000001").await.unwrap());
        assert!(repo.find_by_id("6500000001").await.unwrap().is_none());
        assert!(repo.id_taken("6500000001").await.unwrap());
        assert!(!repo.soft_delete("6500000001").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_all_by_role_pages() {
        let repo = UserRepository::new(connect_test_db().await);
        for i in 0..5 {
            repo.insert(new_user(&format!("650000000{i}"), Role::SgcuAdmin))
                .await
                .unwrap();
        }
        repo.insert(new_user("6600000000", Role::SccuAdmin)).await.unwrap();

        let first = repo
            .find_all_by_role(Role::SgcuAdmin, Pagination { page: 1, page_size: 3 })
            .await
            .unwrap();
        let second = repo
            .find_all_by_role(Role::SgcuAdmin, Pagination { page: 2, page_size: 3 })
            .await
            .unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 2);
        assert!(first.iter().chain(&second).all(|u| u.role_id == Role::SgcuAdmin));
    }
}
