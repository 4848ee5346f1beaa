use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::repository::{AttachmentRepository, DocumentRepository, UserRepository};
use crate::service::{AttachmentService, AuthService, DocumentService, UserService};
use crate::storage::ObjectStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Database connection pool
    pub db: DatabaseConnection,
    pub auth: AuthService,
    pub users: UserService,
    pub documents: DocumentService,
    pub attachments: AttachmentService,
}

impl AppState {
    /// Wire repositories and services around one pool and one object store
    pub fn new(config: Config, db: DatabaseConnection, store: Arc<dyn ObjectStore>) -> Self {
        let user_repo = UserRepository::new(db.clone());
        let document_repo = DocumentRepository::new(db.clone());
        let attachment_repo = AttachmentRepository::new(db.clone());

        Self {
            auth: AuthService::new(user_repo.clone(), config.jwt.clone()),
            users: UserService::new(user_repo.clone()),
            documents: DocumentService::new(
                document_repo.clone(),
                user_repo,
                attachment_repo.clone(),
            ),
            attachments: AttachmentService::new(
                attachment_repo,
                document_repo,
                store,
                config.storage.bucket.clone(),
            ),
            config: Arc::new(config),
            db,
        }
    }
}
