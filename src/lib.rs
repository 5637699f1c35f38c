// Blog CMS - page-tree content model for a blog with authors, tags and galleries

// Schema system and the declarations built on it
pub mod ent_schema;
pub mod schemas;

// Content types
pub mod models;

// Persistence - SQLite pool, page tree and blog store
pub mod infrastructure;

// Page serving and search
pub mod pages;
pub mod search;

// HTTP surface
pub mod blog_interface;
pub mod app_state;

// Common utilities
pub mod config;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
