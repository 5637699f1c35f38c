use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Image, ObjectId};

/// Reusable author snippet, edited outside the page tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: ObjectId,
    pub name: String,
    pub author_image: Option<Image>,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInput {
    pub name: String,
    #[serde(default)]
    pub author_image_id: Option<ObjectId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_displays_as_name() {
        let author = Author {
            id: 1,
            name: "Ada Lovelace".to_string(),
            author_image: None,
        };
        assert_eq!(author.to_string(), "Ada Lovelace");
    }
}
