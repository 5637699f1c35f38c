// Persistence layer
pub mod blog_store;     // Images, authors, index pages and posts
pub mod database;       // SQLite pool and table definitions
pub mod page_tree;      // Page hierarchy and publish state

pub use blog_store::{normalize_tags, BlogPageQuery, BlogStore, PageOrder};
pub use database::{BlogDatabase, ROOT_PAGE_ID};
pub use page_tree::{normalize_path, PageTree};
