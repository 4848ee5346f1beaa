//! SUCU backend - document publishing for student council organizations
//!
//! This crate provides the core functionality of the SUCU backend,
//! including authentication, administration of users, documents and their
//! attachments, and the object storage they are uploaded to.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
