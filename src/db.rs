use chrono::Utc;
use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    DbErr, EntityTrait, Iterable, Schema, Set, Statement,
};
use std::time::Duration;
use tracing::info;

use crate::config::{BootstrapConfig, DatabaseConfig};
use crate::entity::{
    attachment, attachment_type, document, document_type, role, user, AttachmentType,
    DocumentType, Role,
};
use crate::service::auth::hash_password;

/// Initialize database connection, migrate tables and seed lookup rows
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let database_url = config.connection_url();

    info!("Connecting to database: {}:{}/{}", config.host, config.port, config.name);

    let mut opt = ConnectOptions::new(&database_url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug)
        .set_schema_search_path("public");

    let db = Database::connect(opt).await?;
    info!("Database connection established");

    auto_migrate(&db).await?;
    seed_lookups(&db).await?;

    Ok(db)
}

/// Create every table that does not exist yet
pub async fn auto_migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Running auto-migration for all entities...");

    // Lookup tables first, then tables with foreign keys
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(role::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(document_type::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(attachment_type::Entity)).await?;

    create_table_if_not_exists(db, backend, schema.create_table_from_entity(user::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(document::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(attachment::Entity)).await?;

    info!("Auto-migration completed successfully");
    Ok(())
}

/// Insert the role, document type and attachment type codes that are missing
pub async fn seed_lookups(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = Utc::now();

    for code in Role::iter() {
        if role::Entity::find_by_id(code.as_str()).one(db).await?.is_none() {
            role::ActiveModel {
                id: Set(code.as_str().to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            }
            .insert(db)
            .await?;
        }
    }

    for code in DocumentType::iter() {
        if document_type::Entity::find_by_id(code.as_str()).one(db).await?.is_none() {
            document_type::ActiveModel {
                id: Set(code.as_str().to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            }
            .insert(db)
            .await?;
        }
    }

    for code in AttachmentType::iter() {
        if attachment_type::Entity::find_by_id(code.as_str()).one(db).await?.is_none() {
            attachment_type::ActiveModel {
                id: Set(code.as_str().to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}

/// Create the configured superadmin unless a user with that ID exists
pub async fn bootstrap_superadmin(
    db: &DatabaseConnection,
    config: &BootstrapConfig,
) -> Result<(), DbErr> {
    if user::Entity::find_by_id(config.superadmin_id.as_str())
        .one(db)
        .await?
        .is_some()
    {
        return Ok(());
    }

    if !config.role.is_superadmin() {
        tracing::warn!("Bootstrap user {} is created with non-superadmin role {}", config.superadmin_id, config.role);
    }

    let password = hash_password(&config.password).map_err(|e| DbErr::Custom(e.to_string()))?;
    let now = Utc::now();

    user::ActiveModel {
        id: Set(config.superadmin_id.clone()),
        first_name: Set(config.first_name.clone()),
        last_name: Set(config.last_name.clone()),
        password: Set(password),
        role_id: Set(config.role),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(db)
    .await?;

    info!("Bootstrap user created: {} ({})", config.superadmin_id, config.role);
    Ok(())
}

/// Create a table if it doesn't exist
async fn create_table_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: TableCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();

    let sql = backend.build(&stmt);

    db.execute(Statement::from_string(backend, sql.to_string())).await?;

    Ok(())
}

/// Fresh in-memory SQLite database with the production schema
#[cfg(test)]
pub async fn connect_test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // A single connection keeps every query on the same in-memory database
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.unwrap();
    auto_migrate(&db).await.unwrap();
    seed_lookups(&db).await.unwrap();
    db
}
