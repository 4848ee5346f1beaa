//! Persistence queries
//!
//! Reads exclude soft-deleted rows. Deletes stamp `deleted_at` and report
//! whether a live row was affected.

use sea_orm::sea_query::LikeExpr;

pub mod attachment;
pub mod document;
pub mod user;

pub use attachment::{AttachmentRepository, AttachmentRow};
pub use document::{DocumentRepository, DocumentRow};
pub use user::UserRepository;

const LIKE_ESCAPE: char = '\\';

/// `%needle%` with the needle's own wildcards matched literally
pub(crate) fn contains_pattern(needle: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

