use async_trait::async_trait;

use super::{PageContext, RenderRequest, RenderedPage, ServePage};
use crate::error::AppResult;
use crate::infrastructure::BlogStore;
use crate::models::BlogIndexPage;

#[async_trait]
impl ServePage for BlogIndexPage {
    /// Lists every live post, most recently first-published first.
    ///
    /// Posts anywhere in the tree are listed, not only this page's children.
    async fn get_context(self, store: &BlogStore, _request: &RenderRequest) -> AppResult<PageContext> {
        let blog_pages = store.live_by_first_published().await?;
        Ok(PageContext::listing(RenderedPage::BlogIndexPage(self), blog_pages))
    }
}
