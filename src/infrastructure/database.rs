use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

// Root of the content tree, created by `init`
pub const ROOT_PAGE_ID: i64 = 1;

/// SQLite-backed store shared by the page tree and the blog store.
///
/// Foreign keys are switched on for every pooled connection; the cascade and
/// set-null rules declared by the schemas live in the table definitions below.
#[derive(Clone)]
pub struct BlogDatabase {
    pub pool: SqlitePool,
}

impl BlogDatabase {
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        if let Some(dir) = config.file_path().as_deref().and_then(std::path::Path::parent) {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    AppError::ConfigurationError(format!("Cannot create {}: {}", dir.display(), e))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::ConfigurationError(format!("Invalid DATABASE_URL {}: {}", config.url, e)))?
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new();
        if config.is_in_memory() {
            // Each in-memory connection is a separate database
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<std::time::Duration>)
                .max_lifetime(None::<std::time::Duration>);
        } else {
            pool_options = pool_options.max_connections(config.max_connections.max(1));
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to connect to {}: {}", config.url, e))
        })?;

        Ok(Self { pool })
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        let db = Self::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await?;
        db.init().await?;
        Ok(db)
    }

    /// Create tables and the tree root if they do not exist yet.
    pub async fn init(&self) -> AppResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id INTEGER REFERENCES pages(id) ON DELETE CASCADE,
                page_type TEXT NOT NULL,
                title TEXT NOT NULL,
                slug TEXT NOT NULL,
                url_path TEXT NOT NULL UNIQUE,
                depth INTEGER NOT NULL,
                live INTEGER NOT NULL DEFAULT 0,
                has_unpublished_changes INTEGER NOT NULL DEFAULT 1,
                first_published_at INTEGER,
                last_published_at INTEGER,
                created INTEGER NOT NULL,
                updated INTEGER NOT NULL,
                UNIQUE(parent_id, slug)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                file TEXT NOT NULL,
                created INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                author_image_id INTEGER REFERENCES images(id) ON DELETE SET NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS blog_index_pages (
                page_id INTEGER PRIMARY KEY REFERENCES pages(id) ON DELETE CASCADE,
                intro TEXT NOT NULL DEFAULT ''
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS blog_pages (
                page_id INTEGER PRIMARY KEY REFERENCES pages(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                intro TEXT NOT NULL,
                body TEXT NOT NULL DEFAULT ''
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS blog_page_authors (
                page_id INTEGER NOT NULL REFERENCES blog_pages(page_id) ON DELETE CASCADE,
                author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
                PRIMARY KEY(page_id, author_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS blog_page_tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content_object_id INTEGER NOT NULL REFERENCES blog_pages(page_id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                UNIQUE(content_object_id, tag_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS blog_page_gallery_images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                page_id INTEGER NOT NULL REFERENCES blog_pages(page_id) ON DELETE CASCADE,
                image_id INTEGER NOT NULL REFERENCES images(id) ON DELETE CASCADE,
                caption TEXT NOT NULL DEFAULT '',
                sort_order INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // Query indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_pages_type_live ON pages(page_type, live, first_published_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_pages_parent ON pages(parent_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_blog_page_tags_tag ON blog_page_tags(tag_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_gallery_page_order ON blog_page_gallery_images(page_id, sort_order)")
            .execute(&self.pool)
            .await?;

        let now = chrono::Utc::now().timestamp_millis();
        let created = sqlx::query(
            "INSERT OR IGNORE INTO pages (id, parent_id, page_type, title, slug, url_path, depth, live, has_unpublished_changes, created, updated)
             VALUES (?, NULL, 'root', 'Root', 'root', '/', 1, 1, 0, ?, ?)",
        )
        .bind(ROOT_PAGE_ID)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if created.rows_affected() > 0 {
            info!("Initialized content tree root");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let db = BlogDatabase::new_in_memory().await.unwrap();
        db.init().await.unwrap();

        let count: i64 = sqlx::query("SELECT COUNT(*) FROM pages")
            .fetch_one(&db.pool)
            .await
            .unwrap()
            .get(0);
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = BlogDatabase::new_in_memory().await.unwrap();
        let enabled: i64 = sqlx::query("PRAGMA foreign_keys")
            .fetch_one(&db.pool)
            .await
            .unwrap()
            .get(0);
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_file_backed_database_persists_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite:{}?mode=rwc", dir.path().join("blog.db").display()),
            max_connections: 2,
        };

        {
            let db = BlogDatabase::connect(&config).await.unwrap();
            db.init().await.unwrap();
            db.pool.close().await;
        }

        let db = BlogDatabase::connect(&config).await.unwrap();
        let url_path: String = sqlx::query("SELECT url_path FROM pages WHERE id = ?")
            .bind(ROOT_PAGE_ID)
            .fetch_one(&db.pool)
            .await
            .unwrap()
            .get(0);
        assert_eq!(url_path, "/");
    }
}
