//! Entity module - SeaORM entity definitions
//!
//! One module per table, plus the closed enumerations stored in them

pub mod attachment;
pub mod attachment_type;
pub mod document;
pub mod document_type;
pub mod enums;
pub mod role;
pub mod user;

pub use enums::{AttachmentType, DocumentType, Organization, Role, UnknownVariant};
