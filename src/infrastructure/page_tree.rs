// Content tree service - hierarchy, URL paths and the draft/live publish state of every page

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use std::sync::Arc;
use tracing::{debug, info};

use super::database::{BlogDatabase, ROOT_PAGE_ID};
use crate::ent_schema::SchemaRegistry;
use crate::error::{AppError, AppResult};
use crate::models::{millis_to_datetime, EntityType, NewPage, ObjectId, PageKind, PageNode};

pub(crate) const NODE_COLUMNS: &str = "pages.id, pages.parent_id, pages.page_type, pages.title, pages.slug, pages.url_path, pages.depth, pages.live, pages.has_unpublished_changes, pages.first_published_at, pages.last_published_at";

pub(crate) fn node_from_row(row: &SqliteRow) -> AppResult<PageNode> {
    let page_type: String = row.get("page_type");
    let kind = PageKind::parse(&page_type)
        .ok_or_else(|| AppError::Internal(format!("Unknown page type '{}'", page_type)))?;

    Ok(PageNode {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        kind,
        title: row.get("title"),
        slug: row.get("slug"),
        url_path: row.get("url_path"),
        depth: row.get("depth"),
        live: row.get("live"),
        has_unpublished_changes: row.get("has_unpublished_changes"),
        first_published_at: millis_to_datetime(row.get("first_published_at")),
        last_published_at: millis_to_datetime(row.get("last_published_at")),
    })
}

/// Normalizes a request path to the stored form: leading and trailing slash.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Title and slug checks shared by every page kind.
pub(crate) fn validate_new_page(
    registry: &SchemaRegistry,
    entity_type: EntityType,
    page: &NewPage,
) -> AppResult<()> {
    registry.validate_text(entity_type, "title", &page.title)?;
    registry.validate_text(entity_type, "slug", &page.slug)?;
    Ok(())
}

pub(crate) async fn fetch_node(conn: &mut SqliteConnection, id: ObjectId) -> AppResult<PageNode> {
    let row = sqlx::query(&format!("SELECT {} FROM pages WHERE id = ?", NODE_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Page {} not found", id)))?;
    node_from_row(&row)
}

async fn ensure_slug_free(
    conn: &mut SqliteConnection,
    parent_id: ObjectId,
    slug: &str,
    except: Option<ObjectId>,
) -> AppResult<()> {
    let taken: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM pages WHERE parent_id = ? AND slug = ? AND id != ?",
    )
    .bind(parent_id)
    .bind(slug)
    .bind(except.unwrap_or(0))
    .fetch_optional(&mut *conn)
    .await?;

    if taken.is_some() {
        return Err(AppError::Validation(format!(
            "The slug '{}' is already in use within the parent page",
            slug
        )));
    }
    Ok(())
}

/// Inserts a draft node under `parent_id`. Callers run this inside their own transaction.
pub(crate) async fn insert_node(
    conn: &mut SqliteConnection,
    parent_id: ObjectId,
    kind: PageKind,
    page: &NewPage,
) -> AppResult<PageNode> {
    let parent = fetch_node(conn, parent_id).await?;
    ensure_slug_free(conn, parent.id, &page.slug, None).await?;

    let url_path = format!("{}{}/", parent.url_path, page.slug);
    let now = Utc::now().timestamp_millis();

    let result = sqlx::query(
        "INSERT INTO pages (parent_id, page_type, title, slug, url_path, depth, live, has_unpublished_changes, created, updated)
         VALUES (?, ?, ?, ?, ?, ?, 0, 1, ?, ?)",
    )
    .bind(parent.id)
    .bind(kind.as_str())
    .bind(&page.title)
    .bind(&page.slug)
    .bind(&url_path)
    .bind(parent.depth + 1)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    fetch_node(conn, result.last_insert_rowid()).await
}

/// Records an edit: the page keeps its live state but now has unpublished changes.
pub(crate) async fn touch_node(
    conn: &mut SqliteConnection,
    id: ObjectId,
    title: Option<&str>,
) -> AppResult<()> {
    let now = Utc::now().timestamp_millis();
    let result = sqlx::query(
        "UPDATE pages SET title = COALESCE(?, title), has_unpublished_changes = 1, updated = ? WHERE id = ?",
    )
    .bind(title)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Page {} not found", id)));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PageTree {
    db: BlogDatabase,
    registry: Arc<SchemaRegistry>,
}

impl PageTree {
    pub fn new(db: BlogDatabase, registry: Arc<SchemaRegistry>) -> Self {
        Self { db, registry }
    }

    pub async fn get(&self, id: ObjectId) -> AppResult<PageNode> {
        let mut conn = self.db.pool.acquire().await?;
        fetch_node(&mut *conn, id).await
    }

    pub async fn children(&self, id: ObjectId) -> AppResult<Vec<PageNode>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pages WHERE parent_id = ? ORDER BY id",
            NODE_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.db.pool)
        .await?;

        rows.iter().map(node_from_row).collect()
    }

    /// Finds the node serving a URL path, live or not.
    pub async fn resolve_path(&self, path: &str) -> AppResult<Option<PageNode>> {
        let url_path = normalize_path(path);
        let row = sqlx::query(&format!("SELECT {} FROM pages WHERE url_path = ?", NODE_COLUMNS))
            .bind(&url_path)
            .fetch_optional(&self.db.pool)
            .await?;

        row.as_ref().map(node_from_row).transpose()
    }

    /// Creates a draft page with no kind-specific data. Kinds with their own record
    /// are created through `BlogStore` so the node never exists without it.
    pub async fn create_page(
        &self,
        parent_id: ObjectId,
        kind: PageKind,
        page: &NewPage,
    ) -> AppResult<PageNode> {
        if kind == PageKind::Root || kind.has_own_record() {
            return Err(AppError::BadRequest(format!(
                "{} pages cannot be created without their content",
                kind.as_str()
            )));
        }
        validate_new_page(&self.registry, EntityType::Page, page)?;
        let mut conn = self.db.pool.acquire().await?;
        let node = insert_node(&mut *conn, parent_id, kind, page).await?;
        info!(page_id = node.id, url_path = %node.url_path, "Created {} page", kind.as_str());
        Ok(node)
    }

    pub async fn publish(&self, id: ObjectId) -> AppResult<PageNode> {
        self.publish_at(id, Utc::now()).await
    }

    /// Makes the page live. The first publication time is only ever set once.
    pub async fn publish_at(&self, id: ObjectId, at: DateTime<Utc>) -> AppResult<PageNode> {
        let at = at.timestamp_millis();
        let result = sqlx::query(
            "UPDATE pages
             SET live = 1,
                 has_unpublished_changes = 0,
                 first_published_at = COALESCE(first_published_at, ?),
                 last_published_at = ?,
                 updated = ?
             WHERE id = ?",
        )
        .bind(at)
        .bind(at)
        .bind(at)
        .bind(id)
        .execute(&self.db.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Page {} not found", id)));
        }

        let node = self.get(id).await?;
        info!(page_id = id, url_path = %node.url_path, "Published page");
        Ok(node)
    }

    pub async fn unpublish(&self, id: ObjectId) -> AppResult<PageNode> {
        if id == ROOT_PAGE_ID {
            return Err(AppError::BadRequest("The root page cannot be unpublished".to_string()));
        }

        let result = sqlx::query(
            "UPDATE pages SET live = 0, has_unpublished_changes = 1, updated = ? WHERE id = ?",
        )
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(&self.db.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Page {} not found", id)));
        }

        info!(page_id = id, "Unpublished page");
        self.get(id).await
    }

    /// Moves a page and its whole subtree under a new parent.
    pub async fn move_page(&self, id: ObjectId, new_parent_id: ObjectId) -> AppResult<PageNode> {
        if id == ROOT_PAGE_ID {
            return Err(AppError::BadRequest("The root page cannot be moved".to_string()));
        }

        let mut tx = self.db.pool.begin().await?;
        let page = fetch_node(&mut *tx, id).await?;
        let new_parent = fetch_node(&mut *tx, new_parent_id).await?;

        if new_parent.url_path.starts_with(&page.url_path) {
            return Err(AppError::BadRequest(format!(
                "Cannot move page {} below itself",
                id
            )));
        }
        ensure_slug_free(&mut *tx, new_parent.id, &page.slug, Some(page.id)).await?;

        let old_prefix = page.url_path.clone();
        let new_prefix = format!("{}{}/", new_parent.url_path, page.slug);
        let depth_delta = new_parent.depth + 1 - page.depth;

        sqlx::query(
            "UPDATE pages
             SET url_path = ? || substr(url_path, ?), depth = depth + ?
             WHERE substr(url_path, 1, ?) = ?",
        )
        .bind(&new_prefix)
        .bind(old_prefix.chars().count() as i64 + 1)
        .bind(depth_delta)
        .bind(old_prefix.chars().count() as i64)
        .bind(&old_prefix)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE pages SET parent_id = ?, updated = ? WHERE id = ?")
            .bind(new_parent.id)
            .bind(Utc::now().timestamp_millis())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let moved = fetch_node(&mut *tx, id).await?;
        tx.commit().await?;

        info!(page_id = id, from = %old_prefix, to = %moved.url_path, "Moved page");
        Ok(moved)
    }

    /// Deletes a page with all its descendants and everything they own.
    pub async fn delete(&self, id: ObjectId) -> AppResult<()> {
        if id == ROOT_PAGE_ID {
            return Err(AppError::BadRequest("The root page cannot be deleted".to_string()));
        }

        let result = sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Page {} not found", id)));
        }

        debug!(page_id = id, "Deleted page subtree");
        Ok(())
    }

    /// Ids of the page and all of its descendants.
    pub async fn subtree_ids(&self, id: ObjectId) -> AppResult<Vec<ObjectId>> {
        let page = self.get(id).await?;
        let ids = sqlx::query_scalar(
            "SELECT id FROM pages WHERE substr(url_path, 1, ?) = ? ORDER BY id",
        )
        .bind(page.url_path.chars().count() as i64)
        .bind(&page.url_path)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageStatus;
    use crate::schemas::create_schema_registry;
    use chrono::TimeZone;

    async fn tree() -> PageTree {
        let db = BlogDatabase::new_in_memory().await.unwrap();
        PageTree::new(db, Arc::new(create_schema_registry()))
    }

    fn new_page(title: &str, slug: &str) -> NewPage {
        NewPage {
            title: title.to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("blog"), "/blog/");
        assert_eq!(normalize_path("/blog/tags"), "/blog/tags/");
    }

    #[tokio::test]
    async fn test_new_pages_start_as_drafts() {
        let tree = tree().await;
        let page = tree
            .create_page(ROOT_PAGE_ID, PageKind::BlogTagIndexPage, &new_page("Blog", "blog"))
            .await
            .unwrap();

        assert_eq!(page.url_path, "/blog/");
        assert_eq!(page.depth, 2);
        assert_eq!(page.status(), PageStatus::Draft);
        assert!(page.first_published_at.is_none());
    }

    #[tokio::test]
    async fn test_kinds_with_own_record_are_refused() {
        let tree = tree().await;
        for kind in [PageKind::Root, PageKind::BlogIndexPage, PageKind::BlogPage] {
            let err = tree
                .create_page(ROOT_PAGE_ID, kind, &new_page("Blog", "blog"))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        assert!(tree.children(ROOT_PAGE_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_published_at_is_kept_on_republish() {
        let tree = tree().await;
        let page = tree
            .create_page(ROOT_PAGE_ID, PageKind::BlogTagIndexPage, &new_page("Post", "post"))
            .await
            .unwrap();

        let first = Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2023, 6, 1, 9, 0, 0).unwrap();

        tree.publish_at(page.id, first).await.unwrap();
        tree.unpublish(page.id).await.unwrap();
        let republished = tree.publish_at(page.id, second).await.unwrap();

        assert_eq!(republished.status(), PageStatus::Live);
        assert_eq!(republished.first_published_at, Some(first));
        assert_eq!(republished.last_published_at, Some(second));
    }

    #[tokio::test]
    async fn test_sibling_slugs_must_be_unique() {
        let tree = tree().await;
        tree.create_page(ROOT_PAGE_ID, PageKind::BlogTagIndexPage, &new_page("A", "same"))
            .await
            .unwrap();
        let err = tree
            .create_page(ROOT_PAGE_ID, PageKind::BlogTagIndexPage, &new_page("B", "same"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_invalid_slug_rejected() {
        let tree = tree().await;
        let err = tree
            .create_page(ROOT_PAGE_ID, PageKind::BlogTagIndexPage, &new_page("A", "has space"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_move_rewrites_subtree_paths() {
        let tree = tree().await;
        let blog = tree
            .create_page(ROOT_PAGE_ID, PageKind::BlogTagIndexPage, &new_page("Blog", "blog"))
            .await
            .unwrap();
        let news = tree
            .create_page(ROOT_PAGE_ID, PageKind::BlogTagIndexPage, &new_page("News", "news"))
            .await
            .unwrap();
        let post = tree
            .create_page(blog.id, PageKind::BlogTagIndexPage, &new_page("Post", "post"))
            .await
            .unwrap();

        let moved = tree.move_page(blog.id, news.id).await.unwrap();
        assert_eq!(moved.url_path, "/news/blog/");
        assert_eq!(moved.depth, 3);

        let post = tree.get(post.id).await.unwrap();
        assert_eq!(post.url_path, "/news/blog/post/");
        assert_eq!(post.depth, 4);

        assert!(tree.resolve_path("/blog/post").await.unwrap().is_none());
        assert_eq!(
            tree.resolve_path("/news/blog/post/").await.unwrap().map(|p| p.id),
            Some(post.id)
        );
    }

    #[tokio::test]
    async fn test_cannot_move_below_itself() {
        let tree = tree().await;
        let blog = tree
            .create_page(ROOT_PAGE_ID, PageKind::BlogTagIndexPage, &new_page("Blog", "blog"))
            .await
            .unwrap();
        let post = tree
            .create_page(blog.id, PageKind::BlogTagIndexPage, &new_page("Post", "post"))
            .await
            .unwrap();

        let err = tree.move_page(blog.id, post.id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_descendants() {
        let tree = tree().await;
        let blog = tree
            .create_page(ROOT_PAGE_ID, PageKind::BlogTagIndexPage, &new_page("Blog", "blog"))
            .await
            .unwrap();
        let post = tree
            .create_page(blog.id, PageKind::BlogTagIndexPage, &new_page("Post", "post"))
            .await
            .unwrap();

        assert_eq!(tree.subtree_ids(blog.id).await.unwrap(), vec![blog.id, post.id]);
        tree.delete(blog.id).await.unwrap();

        assert!(matches!(tree.get(post.id).await, Err(AppError::NotFound(_))));
        assert!(tree.children(ROOT_PAGE_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_root_cannot_be_deleted() {
        let tree = tree().await;
        assert!(matches!(
            tree.delete(ROOT_PAGE_ID).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
