// Page serving - resolves a URL path to a live page and builds its render context

pub mod blog_index;
pub mod blog_tag_index;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::{BlogStore, PageTree};
use crate::models::{BlogIndexPage, BlogPage, BlogTagIndexPage, PageKind, PageNode};

/// An incoming page request: the URL path plus its query parameters.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

impl RenderRequest {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            query: HashMap::new(),
        }
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// The page being rendered, tagged with its concrete type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page_type", rename_all = "snake_case")]
pub enum RenderedPage {
    Root(PageNode),
    BlogIndexPage(BlogIndexPage),
    BlogTagIndexPage(BlogTagIndexPage),
    BlogPage(BlogPage),
}

/// Template context: the page itself and, for listing pages, the posts to show.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub page: RenderedPage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_pages: Option<Vec<BlogPage>>,
}

impl PageContext {
    pub fn page_only(page: RenderedPage) -> Self {
        Self {
            page,
            blog_pages: None,
        }
    }

    pub fn listing(page: RenderedPage, blog_pages: Vec<BlogPage>) -> Self {
        Self {
            page,
            blog_pages: Some(blog_pages),
        }
    }
}

/// A page type that can build its own render context.
#[async_trait]
pub trait ServePage: Sized + Send {
    async fn get_context(self, store: &BlogStore, request: &RenderRequest) -> AppResult<PageContext>;
}

#[async_trait]
impl ServePage for BlogPage {
    async fn get_context(self, _store: &BlogStore, _request: &RenderRequest) -> AppResult<PageContext> {
        Ok(PageContext::page_only(RenderedPage::BlogPage(self)))
    }
}

#[async_trait]
impl ServePage for PageNode {
    async fn get_context(self, _store: &BlogStore, _request: &RenderRequest) -> AppResult<PageContext> {
        Ok(PageContext::page_only(RenderedPage::Root(self)))
    }
}

#[derive(Clone)]
pub struct PageRenderer {
    tree: PageTree,
    store: BlogStore,
}

impl PageRenderer {
    pub fn new(tree: PageTree, store: BlogStore) -> Self {
        Self { tree, store }
    }

    /// Builds the context for the page at `request.path`.
    ///
    /// Drafts are not served; the tree root always is.
    pub async fn render(&self, request: &RenderRequest) -> AppResult<PageContext> {
        let node = self
            .tree
            .resolve_path(&request.path)
            .await?
            .filter(|node| node.live || node.is_root())
            .ok_or_else(|| AppError::NotFound(format!("No page at {}", request.path)))?;

        debug!(page_id = node.id, kind = node.kind.as_str(), "Rendering page");

        match node.kind {
            PageKind::Root => node.get_context(&self.store, request).await,
            PageKind::BlogIndexPage => {
                let page = self.store.get_blog_index_page(node.id).await?;
                page.get_context(&self.store, request).await
            }
            PageKind::BlogTagIndexPage => {
                let page = self.store.get_blog_tag_index_page(node.id).await?;
                page.get_context(&self.store, request).await
            }
            PageKind::BlogPage => {
                let page = self.store.get_blog_page(node.id).await?;
                page.get_context(&self.store, request).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_lookup() {
        let request = RenderRequest::new("/blog/tags/").with_query("tag", "python");
        assert_eq!(request.query_param("tag"), Some("python"));
        assert_eq!(request.query_param("page"), None);
    }

    #[test]
    fn test_page_only_context_omits_listing() {
        let node = PageNode {
            id: 1,
            parent_id: None,
            kind: PageKind::Root,
            title: "Root".to_string(),
            slug: "root".to_string(),
            url_path: "/".to_string(),
            depth: 1,
            live: true,
            has_unpublished_changes: false,
            first_published_at: None,
            last_published_at: None,
        };
        let value = serde_json::to_value(PageContext::page_only(RenderedPage::Root(node))).unwrap();

        assert_eq!(value["page"]["page_type"], "root");
        assert_eq!(value["page"]["url_path"], "/");
        assert!(value.get("blog_pages").is_none());
    }
}
