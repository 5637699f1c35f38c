use async_trait::async_trait;
use tracing::debug;

use super::{PageContext, RenderRequest, RenderedPage, ServePage};
use crate::error::AppResult;
use crate::infrastructure::BlogStore;
use crate::models::BlogTagIndexPage;

pub const TAG_QUERY_PARAM: &str = "tag";

#[async_trait]
impl ServePage for BlogTagIndexPage {
    /// Lists posts tagged exactly with the `tag` query parameter.
    ///
    /// Unlike the blog index this does not drop unpublished posts.
    async fn get_context(self, store: &BlogStore, request: &RenderRequest) -> AppResult<PageContext> {
        let tag = request.query_param(TAG_QUERY_PARAM).unwrap_or("");
        let blog_pages = if tag.is_empty() {
            Vec::new()
        } else {
            store.find_by_tag(tag).await?
        };

        debug!(tag, matches = blog_pages.len(), "Tag index lookup");
        Ok(PageContext::listing(RenderedPage::BlogTagIndexPage(self), blog_pages))
    }
}
