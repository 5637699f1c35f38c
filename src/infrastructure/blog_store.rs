// Blog store - persistence of images, authors, index pages and posts with their owned associations

use chrono::Utc;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqliteRow};
use sqlx::{QueryBuilder, Row};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::database::BlogDatabase;
use super::page_tree::{fetch_node, insert_node, node_from_row, touch_node, validate_new_page, NODE_COLUMNS};
use crate::ent_schema::SchemaRegistry;
use crate::error::{AppError, AppResult};
use crate::models::{
    Author, AuthorInput, BlogIndexPage, BlogIndexPageInput, BlogPage, BlogPageInput,
    BlogTagIndexPage, EntityType, GalleryImage, GalleryImages, Image, ImageInput, NewPage,
    ObjectId, PageKind, PageNode,
};

/// Sort orders supported by post listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrder {
    /// Tree creation order
    #[default]
    TreeOrder,
    /// Newest first publication first; ties by newest id
    FirstPublishedDesc,
}

/// Typed post query, built up the way listings need it.
#[derive(Debug, Clone, Default)]
pub struct BlogPageQuery {
    live_only: bool,
    tag: Option<String>,
    order: PageOrder,
}

impl BlogPageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only pages currently published
    pub fn live(mut self) -> Self {
        self.live_only = true;
        self
    }

    /// Only pages carrying exactly this tag name
    pub fn tagged(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn order_by(mut self, order: PageOrder) -> Self {
        self.order = order;
        self
    }

    fn build(&self) -> QueryBuilder<'_, Sqlite> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT pages.id FROM pages JOIN blog_pages ON blog_pages.page_id = pages.id WHERE pages.page_type = ",
        );
        qb.push_bind(PageKind::BlogPage.as_str());

        if self.live_only {
            qb.push(" AND pages.live = 1");
        }

        if let Some(tag) = &self.tag {
            qb.push(
                " AND pages.id IN (SELECT blog_page_tags.content_object_id FROM blog_page_tags \
                 JOIN tags ON tags.id = blog_page_tags.tag_id WHERE tags.name = ",
            );
            qb.push_bind(tag.as_str());
            qb.push(")");
        }

        match self.order {
            PageOrder::TreeOrder => qb.push(" ORDER BY pages.id ASC"),
            PageOrder::FirstPublishedDesc => {
                qb.push(" ORDER BY pages.first_published_at DESC, pages.id DESC")
            }
        };

        qb
    }
}

fn push_id_list<'a>(qb: &mut QueryBuilder<'a, Sqlite>, ids: &[ObjectId]) {
    qb.push(" (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

fn optional_image(row: &SqliteRow) -> Option<Image> {
    let id: Option<i64> = row.get("image_id");
    id.map(|id| Image {
        id,
        title: row.get("image_title"),
        file: row.get("image_file"),
    })
}

fn author_from_row(row: &SqliteRow) -> Author {
    Author {
        id: row.get("author_id"),
        name: row.get("author_name"),
        author_image: optional_image(row),
    }
}

/// Tag names as stored: trimmed, non-empty, each once, in submitted order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !seen.iter().any(|t: &String| t == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

const AUTHOR_SELECT: &str = "SELECT authors.id AS author_id, authors.name AS author_name, images.id AS image_id, images.title AS image_title, images.file AS image_file FROM authors LEFT JOIN images ON images.id = authors.author_image_id";

#[derive(Clone)]
pub struct BlogStore {
    db: BlogDatabase,
    registry: Arc<SchemaRegistry>,
}

impl BlogStore {
    pub fn new(db: BlogDatabase, registry: Arc<SchemaRegistry>) -> Self {
        Self { db, registry }
    }

    // Images

    pub async fn create_image(&self, input: &ImageInput) -> AppResult<Image> {
        self.registry.validate_text(EntityType::Image, "title", &input.title)?;
        self.registry.validate_text(EntityType::Image, "file", &input.file)?;

        let result = sqlx::query("INSERT INTO images (title, file, created) VALUES (?, ?, ?)")
            .bind(&input.title)
            .bind(&input.file)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.db.pool)
            .await?;

        Ok(Image {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            file: input.file.clone(),
        })
    }

    pub async fn get_image(&self, id: ObjectId) -> AppResult<Image> {
        let row = sqlx::query("SELECT id, title, file FROM images WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image {} not found", id)))?;

        Ok(Image {
            id: row.get("id"),
            title: row.get("title"),
            file: row.get("file"),
        })
    }

    /// Removes the image. Gallery entries using it go with it; authors just lose their picture.
    pub async fn delete_image(&self, id: ObjectId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Image {} not found", id)));
        }
        info!(image_id = id, "Deleted image");
        Ok(())
    }

    // Authors

    fn validate_author(&self, input: &AuthorInput) -> AppResult<()> {
        self.registry.validate_text(EntityType::Author, "name", input.name.trim())
    }

    pub async fn create_author(&self, input: &AuthorInput) -> AppResult<Author> {
        self.validate_author(input)?;
        let mut conn = self.db.pool.acquire().await?;
        if let Some(image_id) = input.author_image_id {
            ensure_exist(&mut *conn, "images", &[image_id]).await?;
        }

        let result = sqlx::query("INSERT INTO authors (name, author_image_id) VALUES (?, ?)")
            .bind(input.name.trim())
            .bind(input.author_image_id)
            .execute(&mut *conn)
            .await?;
        drop(conn);

        let id = result.last_insert_rowid();
        info!(author_id = id, "Created author {}", input.name);
        self.get_author(id).await
    }

    pub async fn update_author(&self, id: ObjectId, input: &AuthorInput) -> AppResult<Author> {
        self.validate_author(input)?;
        let mut conn = self.db.pool.acquire().await?;
        if let Some(image_id) = input.author_image_id {
            ensure_exist(&mut *conn, "images", &[image_id]).await?;
        }

        let result = sqlx::query("UPDATE authors SET name = ?, author_image_id = ? WHERE id = ?")
            .bind(input.name.trim())
            .bind(input.author_image_id)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        drop(conn);

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        self.get_author(id).await
    }

    pub async fn get_author(&self, id: ObjectId) -> AppResult<Author> {
        let row = sqlx::query(&format!("{} WHERE authors.id = ?", AUTHOR_SELECT))
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;
        Ok(author_from_row(&row))
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query(&format!("{} ORDER BY authors.name, authors.id", AUTHOR_SELECT))
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows.iter().map(author_from_row).collect())
    }

    /// Removes the author and their post links; the posts stay.
    pub async fn delete_author(&self, id: ObjectId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        info!(author_id = id, "Deleted author");
        Ok(())
    }

    // Index pages

    pub async fn create_blog_index_page(
        &self,
        parent_id: ObjectId,
        page: &NewPage,
        input: &BlogIndexPageInput,
    ) -> AppResult<BlogIndexPage> {
        validate_new_page(&self.registry, EntityType::BlogIndexPage, page)?;

        let mut tx = self.db.pool.begin().await?;
        let node = insert_node(&mut *tx, parent_id, PageKind::BlogIndexPage, page).await?;
        sqlx::query("INSERT INTO blog_index_pages (page_id, intro) VALUES (?, ?)")
            .bind(node.id)
            .bind(&input.intro)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(page_id = node.id, url_path = %node.url_path, "Created blog index page");
        Ok(BlogIndexPage {
            node,
            intro: input.intro.clone(),
        })
    }

    pub async fn update_blog_index_page(
        &self,
        id: ObjectId,
        title: Option<&str>,
        input: &BlogIndexPageInput,
    ) -> AppResult<BlogIndexPage> {
        if let Some(title) = title {
            self.registry.validate_text(EntityType::BlogIndexPage, "title", title)?;
        }

        let mut tx = self.db.pool.begin().await?;
        expect_kind(&mut *tx, id, PageKind::BlogIndexPage).await?;
        touch_node(&mut *tx, id, title).await?;
        sqlx::query("UPDATE blog_index_pages SET intro = ? WHERE page_id = ?")
            .bind(&input.intro)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.get_blog_index_page(id).await
    }

    pub async fn get_blog_index_page(&self, id: ObjectId) -> AppResult<BlogIndexPage> {
        let row = sqlx::query(&format!(
            "SELECT {}, blog_index_pages.intro FROM pages JOIN blog_index_pages ON blog_index_pages.page_id = pages.id WHERE pages.id = ?",
            NODE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Blog index page {} not found", id)))?;

        Ok(BlogIndexPage {
            node: node_from_row(&row)?,
            intro: row.get("intro"),
        })
    }

    pub async fn create_blog_tag_index_page(
        &self,
        parent_id: ObjectId,
        page: &NewPage,
    ) -> AppResult<BlogTagIndexPage> {
        validate_new_page(&self.registry, EntityType::BlogTagIndexPage, page)?;

        let mut conn = self.db.pool.acquire().await?;
        let node = insert_node(&mut *conn, parent_id, PageKind::BlogTagIndexPage, page).await?;
        info!(page_id = node.id, url_path = %node.url_path, "Created blog tag index page");
        Ok(BlogTagIndexPage { node })
    }

    pub async fn update_blog_tag_index_page(
        &self,
        id: ObjectId,
        title: Option<&str>,
    ) -> AppResult<BlogTagIndexPage> {
        if let Some(title) = title {
            self.registry.validate_text(EntityType::BlogTagIndexPage, "title", title)?;
        }

        let mut tx = self.db.pool.begin().await?;
        expect_kind(&mut *tx, id, PageKind::BlogTagIndexPage).await?;
        touch_node(&mut *tx, id, title).await?;
        let node = fetch_node(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(BlogTagIndexPage { node })
    }

    pub async fn get_blog_tag_index_page(&self, id: ObjectId) -> AppResult<BlogTagIndexPage> {
        let mut conn = self.db.pool.acquire().await?;
        let node = expect_kind(&mut *conn, id, PageKind::BlogTagIndexPage).await?;
        Ok(BlogTagIndexPage { node })
    }

    // Posts

    fn validate_blog_page(&self, input: &BlogPageInput) -> AppResult<()> {
        self.registry.validate_text(EntityType::BlogPage, "intro", &input.intro)?;
        self.registry.validate_text(EntityType::BlogPage, "body", &input.body)?;
        for tag in normalize_tags(&input.tags) {
            self.registry.validate_text(EntityType::Tag, "name", &tag)?;
        }
        for item in &input.gallery_images {
            self.registry
                .validate_text(EntityType::BlogPageGalleryImage, "caption", &item.caption)?;
        }
        Ok(())
    }

    pub async fn create_blog_page(
        &self,
        parent_id: ObjectId,
        page: &NewPage,
        input: &BlogPageInput,
    ) -> AppResult<BlogPage> {
        validate_new_page(&self.registry, EntityType::BlogPage, page)?;
        self.validate_blog_page(input)?;

        let mut tx = self.db.pool.begin().await?;
        let node = insert_node(&mut *tx, parent_id, PageKind::BlogPage, page).await?;
        sqlx::query("INSERT INTO blog_pages (page_id, date, intro, body) VALUES (?, ?, ?, ?)")
            .bind(node.id)
            .bind(input.date)
            .bind(&input.intro)
            .bind(&input.body)
            .execute(&mut *tx)
            .await?;
        write_associations(&mut *tx, node.id, input).await?;
        tx.commit().await?;

        info!(page_id = node.id, url_path = %node.url_path, "Created blog page");
        self.get_blog_page(node.id).await
    }

    /// Saves new post fields. A live post stays live and is flagged as having unpublished changes.
    pub async fn update_blog_page(
        &self,
        id: ObjectId,
        title: Option<&str>,
        input: &BlogPageInput,
    ) -> AppResult<BlogPage> {
        if let Some(title) = title {
            self.registry.validate_text(EntityType::BlogPage, "title", title)?;
        }
        self.validate_blog_page(input)?;

        let mut tx = self.db.pool.begin().await?;
        expect_kind(&mut *tx, id, PageKind::BlogPage).await?;
        touch_node(&mut *tx, id, title).await?;
        sqlx::query("UPDATE blog_pages SET date = ?, intro = ?, body = ? WHERE page_id = ?")
            .bind(input.date)
            .bind(&input.intro)
            .bind(&input.body)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for table in ["blog_page_authors", "blog_page_gallery_images"] {
            sqlx::query(&format!("DELETE FROM {} WHERE page_id = ?", table))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM blog_page_tags WHERE content_object_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        write_associations(&mut *tx, id, input).await?;
        tx.commit().await?;

        debug!(page_id = id, "Updated blog page");
        self.get_blog_page(id).await
    }

    pub async fn delete_gallery_image(&self, gallery_image_id: ObjectId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM blog_page_gallery_images WHERE id = ?")
            .bind(gallery_image_id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Gallery image {} not found",
                gallery_image_id
            )));
        }
        Ok(())
    }

    pub async fn get_blog_page(&self, id: ObjectId) -> AppResult<BlogPage> {
        self.load_blog_pages(&[id])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Blog page {} not found", id)))
    }

    pub async fn find(&self, query: &BlogPageQuery) -> AppResult<Vec<BlogPage>> {
        let ids: Vec<ObjectId> = query
            .build()
            .build()
            .fetch_all(&self.db.pool)
            .await?
            .iter()
            .map(|row| row.get(0))
            .collect();
        self.load_blog_pages(&ids).await
    }

    /// Published posts, newest first publication first.
    pub async fn live_by_first_published(&self) -> AppResult<Vec<BlogPage>> {
        self.find(&BlogPageQuery::new().live().order_by(PageOrder::FirstPublishedDesc))
            .await
    }

    /// Posts carrying exactly `tag`, published or not.
    pub async fn find_by_tag(&self, tag: &str) -> AppResult<Vec<BlogPage>> {
        self.find(&BlogPageQuery::new().tagged(tag)).await
    }

    /// Hydrates posts with authors, tags and gallery, keeping the order of `ids`.
    pub async fn load_blog_pages(&self, ids: &[ObjectId]) -> AppResult<Vec<BlogPage>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {}, blog_pages.date, blog_pages.intro, blog_pages.body FROM pages \
             JOIN blog_pages ON blog_pages.page_id = pages.id WHERE pages.id IN",
            NODE_COLUMNS
        ));
        push_id_list(&mut qb, ids);
        let rows = qb.build().fetch_all(&self.db.pool).await?;

        let mut base: HashMap<ObjectId, (PageNode, SqliteRow)> = HashMap::new();
        for row in rows {
            let node = node_from_row(&row)?;
            base.insert(node.id, (node, row));
        }

        let mut authors = self.load_authors(ids).await?;
        let mut tags = self.load_tags(ids).await?;
        let mut galleries = self.load_galleries(ids).await?;

        let mut pages = Vec::with_capacity(ids.len());
        for id in ids {
            let Some((node, row)) = base.remove(id) else {
                continue;
            };
            pages.push(BlogPage {
                node,
                date: row.get("date"),
                intro: row.get("intro"),
                body: row.get("body"),
                authors: authors.remove(id).unwrap_or_default(),
                tags: tags.remove(id).unwrap_or_default(),
                gallery_images: GalleryImages::from_unsorted(
                    galleries.remove(id).unwrap_or_default(),
                ),
            });
        }
        Ok(pages)
    }

    async fn load_authors(&self, ids: &[ObjectId]) -> AppResult<HashMap<ObjectId, Vec<Author>>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT blog_page_authors.page_id, authors.id AS author_id, authors.name AS author_name, \
             images.id AS image_id, images.title AS image_title, images.file AS image_file \
             FROM blog_page_authors JOIN authors ON authors.id = blog_page_authors.author_id \
             LEFT JOIN images ON images.id = authors.author_image_id \
             WHERE blog_page_authors.page_id IN",
        );
        push_id_list(&mut qb, ids);
        qb.push(" ORDER BY authors.name, authors.id");

        let mut by_page: HashMap<ObjectId, Vec<Author>> = HashMap::new();
        for row in qb.build().fetch_all(&self.db.pool).await? {
            by_page
                .entry(row.get("page_id"))
                .or_default()
                .push(author_from_row(&row));
        }
        Ok(by_page)
    }

    async fn load_tags(&self, ids: &[ObjectId]) -> AppResult<HashMap<ObjectId, Vec<String>>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT blog_page_tags.content_object_id, tags.name FROM blog_page_tags \
             JOIN tags ON tags.id = blog_page_tags.tag_id WHERE blog_page_tags.content_object_id IN",
        );
        push_id_list(&mut qb, ids);
        qb.push(" ORDER BY tags.name");

        let mut by_page: HashMap<ObjectId, Vec<String>> = HashMap::new();
        for row in qb.build().fetch_all(&self.db.pool).await? {
            by_page
                .entry(row.get("content_object_id"))
                .or_default()
                .push(row.get("name"));
        }
        Ok(by_page)
    }

    async fn load_galleries(
        &self,
        ids: &[ObjectId],
    ) -> AppResult<HashMap<ObjectId, Vec<GalleryImage>>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT g.id, g.page_id, g.caption, g.sort_order, images.id AS image_id, \
             images.title AS image_title, images.file AS image_file \
             FROM blog_page_gallery_images g JOIN images ON images.id = g.image_id \
             WHERE g.page_id IN",
        );
        push_id_list(&mut qb, ids);
        qb.push(" ORDER BY g.sort_order, g.id");

        let mut by_page: HashMap<ObjectId, Vec<GalleryImage>> = HashMap::new();
        for row in qb.build().fetch_all(&self.db.pool).await? {
            let Some(image) = optional_image(&row) else {
                continue;
            };
            by_page.entry(row.get("page_id")).or_default().push(GalleryImage {
                id: row.get("id"),
                image,
                caption: row.get("caption"),
                sort_order: row.get("sort_order"),
            });
        }
        Ok(by_page)
    }
}

async fn expect_kind(
    conn: &mut SqliteConnection,
    id: ObjectId,
    kind: PageKind,
) -> AppResult<PageNode> {
    let node = fetch_node(conn, id).await?;
    if node.kind != kind {
        return Err(AppError::NotFound(format!(
            "Page {} is not a {}",
            id,
            kind.as_str()
        )));
    }
    Ok(node)
}

/// Fails with a validation error naming the first id missing from `table`.
async fn ensure_exist(conn: &mut SqliteConnection, table: &'static str, ids: &[ObjectId]) -> AppResult<()> {
    for id in ids {
        let found: Option<i64> = sqlx::query_scalar(&format!("SELECT id FROM {} WHERE id = ?", table))
            .bind(*id)
            .fetch_optional(&mut *conn)
            .await?;
        if found.is_none() {
            return Err(AppError::Validation(format!(
                "Unknown {} id {}",
                table.trim_end_matches('s'),
                id
            )));
        }
    }
    Ok(())
}

/// Looks a tag up by name, creating it with a unique slug when new.
async fn tag_id_for(conn: &mut SqliteConnection, name: &str) -> AppResult<ObjectId> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM tags WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let base = match slug::slugify(name) {
        s if s.is_empty() => "tag".to_string(),
        s => s,
    };
    let mut candidate = base.clone();
    let mut n = 1;
    loop {
        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM tags WHERE slug = ?")
            .bind(&candidate)
            .fetch_optional(&mut *conn)
            .await?;
        if taken.is_none() {
            break;
        }
        candidate = format!("{}_{}", base, n);
        n += 1;
    }

    let result = sqlx::query("INSERT INTO tags (name, slug) VALUES (?, ?)")
        .bind(name)
        .bind(&candidate)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

async fn write_associations(
    conn: &mut SqliteConnection,
    page_id: ObjectId,
    input: &BlogPageInput,
) -> AppResult<()> {
    let mut author_ids = input.author_ids.clone();
    author_ids.sort_unstable();
    author_ids.dedup();
    ensure_exist(conn, "authors", &author_ids).await?;
    for author_id in &author_ids {
        sqlx::query("INSERT INTO blog_page_authors (page_id, author_id) VALUES (?, ?)")
            .bind(page_id)
            .bind(*author_id)
            .execute(&mut *conn)
            .await?;
    }

    for name in normalize_tags(&input.tags) {
        let tag_id = tag_id_for(conn, &name).await?;
        sqlx::query("INSERT INTO blog_page_tags (content_object_id, tag_id) VALUES (?, ?)")
            .bind(page_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    let image_ids: Vec<ObjectId> = input.gallery_images.iter().map(|g| g.image_id).collect();
    ensure_exist(conn, "images", &image_ids).await?;
    for (position, item) in input.gallery_images.iter().enumerate() {
        sqlx::query(
            "INSERT INTO blog_page_gallery_images (page_id, image_id, caption, sort_order) VALUES (?, ?, ?, ?)",
        )
        .bind(page_id)
        .bind(item.image_id)
        .bind(&item.caption)
        .bind(item.sort_order.unwrap_or(position as i64))
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " python ".to_string(),
            "".to_string(),
            "rust".to_string(),
            "python".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["python", "rust"]);
    }

    #[test]
    fn test_live_query_sql() {
        let query = BlogPageQuery::new()
            .live()
            .order_by(PageOrder::FirstPublishedDesc);
        let qb = query.build();
        let sql = qb.sql();

        assert!(sql.contains("pages.live = 1"));
        assert!(sql.ends_with("ORDER BY pages.first_published_at DESC, pages.id DESC"));
        assert!(!sql.contains("tags.name"));
    }

    #[test]
    fn test_tag_query_has_no_live_filter() {
        let query = BlogPageQuery::new().tagged("python");
        let qb = query.build();
        let sql = qb.sql();

        assert!(sql.contains("tags.name = ?"));
        assert!(!sql.contains("pages.live"));
        assert!(sql.ends_with("ORDER BY pages.id ASC"));
    }
}
