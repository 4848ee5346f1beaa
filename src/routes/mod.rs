use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Json,
    routing::{get, post, put, MethodRouter},
    Router,
};
use serde::Serialize;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::CorsConfig;
use crate::handlers;
use crate::middleware::{auth_layer, require_admin, require_superadmin};
use crate::state::AppState;

pub mod health;

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            result: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a result body
    pub fn empty() -> Self {
        Self {
            success: true,
            result: None,
            message: None,
        }
    }
}

/// Bearer authentication only
fn authenticated(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(state.clone(), auth_layer))
}

/// Admin or superadmin of either organization
fn admin(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    authenticated(state, route.route_layer(middleware::from_fn(require_admin)))
}

/// Superadmin of either organization
fn superadmin(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    authenticated(state, route.route_layer(middleware::from_fn(require_superadmin)))
}

/// CORS for the configured comma-separated origins
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<&str> = config
        .allow_origin
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .collect();

    // Credentials rule out a literal wildcard, echo the caller's origin instead
    let allow_origin = if origins.contains(&"*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins.into_iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(300))
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_size);

    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/me",
            authenticated(&state, get(handlers::auth::me).put(handlers::auth::update_me)),
        )
        // User routes
        .route(
            "/users",
            superadmin(
                &state,
                get(handlers::user::get_all_users).post(handlers::user::create_user),
            ),
        )
        .route(
            "/users/:user_id",
            superadmin(
                &state,
                get(handlers::user::get_user)
                    .put(handlers::user::update_user)
                    .delete(handlers::user::delete_user),
            ),
        )
        // Document routes
        .route(
            "/documents",
            get(handlers::document::get_all_documents)
                .merge(admin(&state, post(handlers::document::create_document))),
        )
        .route(
            "/documents/role/:role_id",
            admin(&state, get(handlers::document::get_documents_by_role)),
        )
        .route(
            "/documents/:document_id",
            get(handlers::document::get_document).merge(admin(
                &state,
                put(handlers::document::update_document)
                    .delete(handlers::document::delete_document),
            )),
        )
        // Attachment routes
        .route("/attachments", get(handlers::attachment::get_all_attachments))
        .route(
            "/attachments/role/:role_id",
            admin(&state, get(handlers::attachment::get_attachments_by_role)),
        )
        // POST takes a document ID, DELETE an attachment ID
        .route(
            "/attachments/:id",
            admin(
                &state,
                post(handlers::attachment::create_attachments)
                    .layer(upload_limit)
                    .delete(handlers::attachment::delete_attachment),
            ),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors))
        .with_state(state)
}

/// Fallback handler for 404
pub async fn fallback() -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error("Not Found")))
}
