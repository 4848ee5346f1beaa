//! Usecases between handlers and repositories

use serde::Serialize;

use filter::Pagination;

pub mod attachment;
pub mod auth;
pub mod document;
pub mod filter;
pub mod user;

pub use attachment::AttachmentService;
pub use auth::AuthService;
pub use document::DocumentService;
pub use user::UserService;

/// One page of a listing. Counters are rendered as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationResponse<T> {
    pub data: Vec<T>,
    pub page: String,
    pub limit: String,
    pub total_pages: String,
}

impl<T> PaginationResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        let total_pages = pagination.total_pages(data.len());
        Self {
            data,
            page: pagination.page.to_string(),
            limit: pagination.page_size.to_string(),
            total_pages: total_pages.to_string(),
        }
    }
}

/// Empty strings count as absent
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
