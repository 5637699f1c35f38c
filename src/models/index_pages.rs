use serde::{Deserialize, Serialize};

use super::PageNode;

/// Listing root for posts. Holds no post data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogIndexPage {
    #[serde(flatten)]
    pub node: PageNode,
    /// Rich text, passed through untouched.
    pub intro: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogIndexPageInput {
    #[serde(default)]
    pub intro: String,
}

/// Listing root filtered by the `tag` query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogTagIndexPage {
    #[serde(flatten)]
    pub node: PageNode,
}
