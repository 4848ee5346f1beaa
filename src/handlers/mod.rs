//! Request handlers module

pub mod attachment;
pub mod auth;
pub mod document;
pub mod user;
