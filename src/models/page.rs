use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ObjectId;

/// Concrete type of a page-tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Root,
    BlogIndexPage,
    BlogTagIndexPage,
    BlogPage,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Root => "root",
            PageKind::BlogIndexPage => "blog_index_page",
            PageKind::BlogTagIndexPage => "blog_tag_index_page",
            PageKind::BlogPage => "blog_page",
        }
    }

    /// Kinds whose fields live in a table of their own next to the tree node.
    pub fn has_own_record(&self) -> bool {
        matches!(self, PageKind::BlogIndexPage | PageKind::BlogPage)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "root" => Some(PageKind::Root),
            "blog_index_page" => Some(PageKind::BlogIndexPage),
            "blog_tag_index_page" => Some(PageKind::BlogTagIndexPage),
            "blog_page" => Some(PageKind::BlogPage),
            _ => None,
        }
    }
}

/// Publish state of a node. Draft -> publish -> Live -> unpublish -> Draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Draft,
    Live,
    /// Live, with edits saved since the last publish.
    LiveWithChanges,
}

/// A node of the content tree, without any kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub id: ObjectId,
    pub parent_id: Option<ObjectId>,
    pub kind: PageKind,
    pub title: String,
    pub slug: String,
    pub url_path: String,
    pub depth: i64,
    pub live: bool,
    pub has_unpublished_changes: bool,
    pub first_published_at: Option<DateTime<Utc>>,
    pub last_published_at: Option<DateTime<Utc>>,
}

impl PageNode {
    pub fn status(&self) -> PageStatus {
        match (self.live, self.has_unpublished_changes) {
            (false, _) => PageStatus::Draft,
            (true, false) => PageStatus::Live,
            (true, true) => PageStatus::LiveWithChanges,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Base fields shared by every page kind on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPage {
    pub title: String,
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(live: bool, has_unpublished_changes: bool) -> PageNode {
        PageNode {
            id: 2,
            parent_id: Some(1),
            kind: PageKind::BlogPage,
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            url_path: "/hello/".to_string(),
            depth: 2,
            live,
            has_unpublished_changes,
            first_published_at: None,
            last_published_at: None,
        }
    }

    #[test]
    fn test_status_from_flags() {
        assert_eq!(node(false, true).status(), PageStatus::Draft);
        assert_eq!(node(true, false).status(), PageStatus::Live);
        assert_eq!(node(true, true).status(), PageStatus::LiveWithChanges);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert_eq!(PageKind::parse("blog_page"), Some(PageKind::BlogPage));
        assert_eq!(PageKind::parse("home_page"), None);
    }
}
