// Blog content model - plain data types shared by the stores, page contexts and HTTP layer

pub mod author;
pub mod blog_page;
pub mod image;
pub mod index_pages;
pub mod page;

pub use author::{Author, AuthorInput};
pub use blog_page::{BlogPage, BlogPageInput, GalleryImage, GalleryImageInput, GalleryImages};
pub use image::{Image, ImageInput};
pub use index_pages::{BlogIndexPage, BlogIndexPageInput, BlogTagIndexPage};
pub use page::{NewPage, PageKind, PageNode, PageStatus};

pub type ObjectId = i64;

// Every schema-described record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Page,
    Image,
    Author,
    Tag,
    BlogIndexPage,
    BlogTagIndexPage,
    BlogPage,
    BlogPageTag,
    BlogPageGalleryImage,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Page => "page",
            EntityType::Image => "image",
            EntityType::Author => "author",
            EntityType::Tag => "tag",
            EntityType::BlogIndexPage => "blog_index_page",
            EntityType::BlogTagIndexPage => "blog_tag_index_page",
            EntityType::BlogPage => "blog_page",
            EntityType::BlogPageTag => "blog_page_tag",
            EntityType::BlogPageGalleryImage => "blog_page_gallery_image",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let entity = match value {
            "page" => EntityType::Page,
            "image" => EntityType::Image,
            "author" => EntityType::Author,
            "tag" => EntityType::Tag,
            "blog_index_page" => EntityType::BlogIndexPage,
            "blog_tag_index_page" => EntityType::BlogTagIndexPage,
            "blog_page" => EntityType::BlogPage,
            "blog_page_tag" => EntityType::BlogPageTag,
            "blog_page_gallery_image" => EntityType::BlogPageGalleryImage,
            _ => return None,
        };
        Some(entity)
    }
}

/// Timestamps are persisted as unix milliseconds.
pub(crate) fn millis_to_datetime(value: Option<i64>) -> Option<chrono::DateTime<chrono::Utc>> {
    value.and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_names_round_trip() {
        for entity in [
            EntityType::Page,
            EntityType::Image,
            EntityType::Author,
            EntityType::Tag,
            EntityType::BlogIndexPage,
            EntityType::BlogTagIndexPage,
            EntityType::BlogPage,
            EntityType::BlogPageTag,
            EntityType::BlogPageGalleryImage,
        ] {
            assert_eq!(EntityType::parse(entity.as_str()), Some(entity));
        }
        assert_eq!(EntityType::parse("ent_user"), None);
    }
}
