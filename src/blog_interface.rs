// Blog interface - single entry point for page serving, editing and search over HTTP

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    ent_schema::{EntityDeclaration, SchemaRegistry},
    error::{AppError, AppResult},
    infrastructure::{BlogDatabase, BlogStore, PageTree},
    models::{
        Author, AuthorInput, BlogIndexPageInput, BlogPageInput, EntityType, Image, ImageInput,
        NewPage, ObjectId, PageKind, PageNode,
    },
    pages::{PageContext, PageRenderer, RenderRequest},
    schemas::create_schema_registry,
    search::{SearchBackend, SearchDocument, SearchHit},
};

/// Kind-specific content of a page in create and update requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "page_type", rename_all = "snake_case")]
pub enum PageContent {
    BlogIndexPage(BlogIndexPageInput),
    BlogTagIndexPage,
    BlogPage(BlogPageInput),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePageRequest {
    pub parent_id: ObjectId,
    pub title: String,
    pub slug: String,
    #[serde(flatten)]
    pub content: PageContent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePageRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub content: PageContent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovePageRequest {
    pub new_parent_id: ObjectId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

fn search_entity(kind: PageKind) -> Option<EntityType> {
    match kind {
        PageKind::Root => None,
        PageKind::BlogIndexPage => Some(EntityType::BlogIndexPage),
        PageKind::BlogTagIndexPage => Some(EntityType::BlogTagIndexPage),
        PageKind::BlogPage => Some(EntityType::BlogPage),
    }
}

#[derive(Clone)]
pub struct BlogInterface {
    registry: Arc<SchemaRegistry>,
    tree: PageTree,
    store: BlogStore,
    renderer: PageRenderer,
    search: Arc<dyn SearchBackend>,
}

impl BlogInterface {
    pub fn new(db: BlogDatabase, search: Arc<dyn SearchBackend>) -> AppResult<Self> {
        let registry = create_schema_registry();
        registry.validate().map_err(|errors| {
            AppError::ConfigurationError(format!("Invalid schemas: {}", errors.join("; ")))
        })?;
        let registry = Arc::new(registry);

        let tree = PageTree::new(db.clone(), Arc::clone(&registry));
        let store = BlogStore::new(db, Arc::clone(&registry));
        let renderer = PageRenderer::new(tree.clone(), store.clone());

        Ok(Self {
            registry,
            tree,
            store,
            renderer,
            search,
        })
    }

    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    pub fn store(&self) -> &BlogStore {
        &self.store
    }

    // Serving

    pub async fn render(&self, request: &RenderRequest) -> AppResult<PageContext> {
        self.renderer.render(request).await
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<SearchHit>> {
        self.search.search(query, true).await
    }

    /// Editor panel layout and field definitions for one entity type.
    pub fn panels(&self, entity: &str) -> AppResult<&EntityDeclaration> {
        EntityType::parse(entity)
            .and_then(|entity_type| self.registry.get(&entity_type))
            .ok_or_else(|| AppError::NotFound(format!("Unknown entity type {}", entity)))
    }

    // Pages

    pub async fn create_page(&self, request: CreatePageRequest) -> AppResult<PageNode> {
        let page = NewPage {
            title: request.title,
            slug: request.slug,
        };
        let node = match &request.content {
            PageContent::BlogIndexPage(input) => {
                self.store
                    .create_blog_index_page(request.parent_id, &page, input)
                    .await?
                    .node
            }
            PageContent::BlogTagIndexPage => {
                self.store
                    .create_blog_tag_index_page(request.parent_id, &page)
                    .await?
                    .node
            }
            PageContent::BlogPage(input) => {
                self.store
                    .create_blog_page(request.parent_id, &page, input)
                    .await?
                    .node
            }
        };

        self.reindex(&node).await;
        Ok(node)
    }

    pub async fn update_page(&self, id: ObjectId, request: UpdatePageRequest) -> AppResult<PageNode> {
        let title = request.title.as_deref();
        let node = match &request.content {
            PageContent::BlogIndexPage(input) => {
                self.store.update_blog_index_page(id, title, input).await?.node
            }
            PageContent::BlogTagIndexPage => {
                self.store.update_blog_tag_index_page(id, title).await?.node
            }
            PageContent::BlogPage(input) => self.store.update_blog_page(id, title, input).await?.node,
        };

        self.reindex(&node).await;
        Ok(node)
    }

    pub async fn publish(&self, id: ObjectId) -> AppResult<PageNode> {
        let node = self.tree.publish(id).await?;
        self.reindex(&node).await;
        Ok(node)
    }

    pub async fn unpublish(&self, id: ObjectId) -> AppResult<PageNode> {
        let node = self.tree.unpublish(id).await?;
        self.reindex(&node).await;
        Ok(node)
    }

    pub async fn move_page(&self, id: ObjectId, new_parent_id: ObjectId) -> AppResult<PageNode> {
        let node = self.tree.move_page(id, new_parent_id).await?;
        if let Err(err) = self.reindex_subtree(id).await {
            warn!(page_id = id, error = %err, "Search index not refreshed after move");
        }
        Ok(node)
    }

    pub async fn delete_page(&self, id: ObjectId) -> AppResult<()> {
        let mut removed = Vec::new();
        for page_id in self.tree.subtree_ids(id).await? {
            removed.push(self.tree.get(page_id).await?);
        }

        self.tree.delete(id).await?;

        for node in removed {
            if let Some(entity_type) = search_entity(node.kind) {
                if let Err(err) = self.search.remove(entity_type, node.id).await {
                    warn!(page_id = node.id, error = %err, "Search document not removed");
                }
            }
        }
        info!(page_id = id, "Deleted page");
        Ok(())
    }

    /// Refreshes the search document of one page. Runs after the write has committed,
    /// so a failure is logged and the saved page is still returned.
    async fn reindex(&self, node: &PageNode) {
        if let Err(err) = self.index_page(node).await {
            warn!(page_id = node.id, error = %err, "Search index not refreshed");
        }
    }

    async fn reindex_subtree(&self, id: ObjectId) -> AppResult<()> {
        for page_id in self.tree.subtree_ids(id).await? {
            let node = self.tree.get(page_id).await?;
            self.reindex(&node).await;
        }
        Ok(())
    }

    async fn index_page(&self, node: &PageNode) -> AppResult<()> {
        let Some(entity_type) = search_entity(node.kind) else {
            return Ok(());
        };

        let document = match node.kind {
            PageKind::BlogPage => {
                let page = self.store.get_blog_page(node.id).await?;
                SearchDocument::build(&self.registry, entity_type, &page)?
            }
            PageKind::BlogIndexPage => {
                let page = self.store.get_blog_index_page(node.id).await?;
                SearchDocument::build(&self.registry, entity_type, &page)?
            }
            PageKind::BlogTagIndexPage | PageKind::Root => {
                SearchDocument::build(&self.registry, entity_type, node)?
            }
        };

        self.search.index(document).await
    }

    // Images and authors

    pub async fn create_image(&self, input: &ImageInput) -> AppResult<Image> {
        self.store.create_image(input).await
    }

    pub async fn get_image(&self, id: ObjectId) -> AppResult<Image> {
        self.store.get_image(id).await
    }

    /// Drops one gallery entry; the post's main image moves to the next one.
    pub async fn delete_gallery_image(&self, id: ObjectId) -> AppResult<()> {
        self.store.delete_gallery_image(id).await
    }

    /// Gallery entries using the image go with it; authors keep their record without a picture.
    pub async fn delete_image(&self, id: ObjectId) -> AppResult<()> {
        self.store.delete_image(id).await
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.store.list_authors().await
    }

    pub async fn get_author(&self, id: ObjectId) -> AppResult<Author> {
        self.store.get_author(id).await
    }

    pub async fn create_author(&self, input: &AuthorInput) -> AppResult<Author> {
        self.store.create_author(input).await
    }

    pub async fn update_author(&self, id: ObjectId, input: &AuthorInput) -> AppResult<Author> {
        self.store.update_author(id, input).await
    }

    pub async fn delete_author(&self, id: ObjectId) -> AppResult<()> {
        self.store.delete_author(id).await
    }
}

// HTTP Handlers

pub async fn render_root_handler(
    State(blog): State<BlogInterface>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<PageContext>, AppError> {
    let request = RenderRequest {
        path: "/".to_string(),
        query,
    };
    Ok(Json(blog.render(&request).await?))
}

pub async fn render_page_handler(
    State(blog): State<BlogInterface>,
    AxumPath(path): AxumPath<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<PageContext>, AppError> {
    let request = RenderRequest { path, query };
    Ok(Json(blog.render(&request).await?))
}

pub async fn search_handler(
    State(blog): State<BlogInterface>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    Ok(Json(blog.search(&params.q).await?))
}

pub async fn panels_handler(
    State(blog): State<BlogInterface>,
    AxumPath(entity): AxumPath<String>,
) -> Result<Json<EntityDeclaration>, AppError> {
    Ok(Json(blog.panels(&entity)?.clone()))
}

pub async fn create_page_handler(
    State(blog): State<BlogInterface>,
    Json(req): Json<CreatePageRequest>,
) -> Result<(StatusCode, Json<PageNode>), AppError> {
    let node = blog.create_page(req).await?;
    Ok((StatusCode::CREATED, Json(node)))
}

pub async fn update_page_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
    Json(req): Json<UpdatePageRequest>,
) -> Result<Json<PageNode>, AppError> {
    Ok(Json(blog.update_page(id, req).await?))
}

pub async fn delete_page_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
) -> Result<Json<Value>, AppError> {
    blog.delete_page(id).await?;
    Ok(Json(json!({"id": id, "deleted": true})))
}

pub async fn publish_page_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
) -> Result<Json<PageNode>, AppError> {
    Ok(Json(blog.publish(id).await?))
}

pub async fn unpublish_page_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
) -> Result<Json<PageNode>, AppError> {
    Ok(Json(blog.unpublish(id).await?))
}

pub async fn move_page_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
    Json(req): Json<MovePageRequest>,
) -> Result<Json<PageNode>, AppError> {
    Ok(Json(blog.move_page(id, req.new_parent_id).await?))
}

pub async fn create_image_handler(
    State(blog): State<BlogInterface>,
    Json(req): Json<ImageInput>,
) -> Result<(StatusCode, Json<Image>), AppError> {
    let image = blog.create_image(&req).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

pub async fn get_image_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
) -> Result<Json<Image>, AppError> {
    Ok(Json(blog.get_image(id).await?))
}

pub async fn delete_gallery_image_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
) -> Result<Json<Value>, AppError> {
    blog.delete_gallery_image(id).await?;
    Ok(Json(json!({"id": id, "deleted": true})))
}

pub async fn delete_image_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
) -> Result<Json<Value>, AppError> {
    blog.delete_image(id).await?;
    Ok(Json(json!({"id": id, "deleted": true})))
}

pub async fn list_authors_handler(
    State(blog): State<BlogInterface>,
) -> Result<Json<Vec<Author>>, AppError> {
    Ok(Json(blog.list_authors().await?))
}

pub async fn get_author_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
) -> Result<Json<Author>, AppError> {
    Ok(Json(blog.get_author(id).await?))
}

pub async fn create_author_handler(
    State(blog): State<BlogInterface>,
    Json(req): Json<AuthorInput>,
) -> Result<(StatusCode, Json<Author>), AppError> {
    let author = blog.create_author(&req).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn update_author_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
    Json(req): Json<AuthorInput>,
) -> Result<Json<Author>, AppError> {
    Ok(Json(blog.update_author(id, &req).await?))
}

pub async fn delete_author_handler(
    State(blog): State<BlogInterface>,
    AxumPath(id): AxumPath<ObjectId>,
) -> Result<Json<Value>, AppError> {
    blog.delete_author(id).await?;
    Ok(Json(json!({"id": id, "deleted": true})))
}

// Create blog router
pub fn create_blog_router(blog: BlogInterface) -> Router {
    Router::new()
        // Public pages
        .route("/pages", get(render_root_handler))
        .route("/pages/{*path}", get(render_page_handler))
        .route("/search", get(search_handler))

        // Page editing
        .route("/admin/pages", post(create_page_handler))
        .route(
            "/admin/pages/{id}",
            put(update_page_handler).delete(delete_page_handler),
        )
        .route("/admin/pages/{id}/publish", post(publish_page_handler))
        .route("/admin/pages/{id}/unpublish", post(unpublish_page_handler))
        .route("/admin/pages/{id}/move", post(move_page_handler))

        // Snippets and images
        .route("/admin/images", post(create_image_handler))
        .route("/admin/images/{id}", get(get_image_handler).delete(delete_image_handler))
        .route("/admin/gallery-images/{id}", delete(delete_gallery_image_handler))
        .route("/admin/authors", get(list_authors_handler).post(create_author_handler))
        .route(
            "/admin/authors/{id}",
            get(get_author_handler)
                .put(update_author_handler)
                .delete(delete_author_handler),
        )

        // Editor layout
        .route("/admin/panels/{entity}", get(panels_handler))

        .with_state(blog)
}
