use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use super::{Author, Image, ObjectId, PageNode};

/// One image of a post's gallery with its caption and explicit position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: ObjectId,
    pub image: Image,
    pub caption: String,
    pub sort_order: i64,
}

/// Gallery of a single post, always kept ordered by `sort_order`.
///
/// The collection is owned by its post: it is loaded, replaced and deleted
/// together with it and never shared between posts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GalleryImages {
    items: Vec<GalleryImage>,
}

impl GalleryImages {
    /// Builds the gallery from rows in any order. Equal sort keys keep their relative order.
    pub fn from_unsorted(mut items: Vec<GalleryImage>) -> Self {
        items.sort_by_key(|item| item.sort_order);
        Self { items }
    }

    pub fn first(&self) -> Option<&GalleryImage> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GalleryImage> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a GalleryImages {
    type Item = &'a GalleryImage;
    type IntoIter = std::slice::Iter<'a, GalleryImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A blog post: a page-tree node plus its post fields and owned associations.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogPage {
    pub node: PageNode,
    pub date: NaiveDate,
    pub intro: String,
    /// Rich text, passed through untouched.
    pub body: String,
    pub authors: Vec<Author>,
    pub tags: Vec<String>,
    pub gallery_images: GalleryImages,
}

impl BlogPage {
    /// Image of the lowest-ordered gallery entry, if the post has any.
    pub fn main_image(&self) -> Option<&Image> {
        self.gallery_images.first().map(|item| &item.image)
    }
}

// Templates read `main_image` like a field, so it is serialized alongside the stored ones.
impl Serialize for BlogPage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct BlogPageView<'a> {
            #[serde(flatten)]
            node: &'a PageNode,
            date: &'a NaiveDate,
            intro: &'a str,
            body: &'a str,
            authors: &'a [Author],
            tags: &'a [String],
            gallery_images: &'a GalleryImages,
            main_image: Option<&'a Image>,
        }

        BlogPageView {
            node: &self.node,
            date: &self.date,
            intro: &self.intro,
            body: &self.body,
            authors: &self.authors,
            tags: &self.tags,
            gallery_images: &self.gallery_images,
            main_image: self.main_image(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImageInput {
    pub image_id: ObjectId,
    #[serde(default)]
    pub caption: String,
    /// Defaults to the entry's position in the submitted list.
    #[serde(default)]
    pub sort_order: Option<i64>,
}

/// Editable post fields. Authors, tags and gallery replace the stored sets on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPageInput {
    pub date: NaiveDate,
    pub intro: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author_ids: Vec<ObjectId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub gallery_images: Vec<GalleryImageInput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageKind;

    fn image(id: ObjectId) -> Image {
        Image {
            id,
            title: format!("img{}", id),
            file: format!("original_images/img{}.jpg", id),
        }
    }

    fn gallery_item(id: ObjectId, image_id: ObjectId, sort_order: i64) -> GalleryImage {
        GalleryImage {
            id,
            image: image(image_id),
            caption: String::new(),
            sort_order,
        }
    }

    fn post(gallery_images: GalleryImages) -> BlogPage {
        BlogPage {
            node: PageNode {
                id: 10,
                parent_id: Some(2),
                kind: PageKind::BlogPage,
                title: "P".to_string(),
                slug: "p".to_string(),
                url_path: "/blog/p/".to_string(),
                depth: 3,
                live: true,
                has_unpublished_changes: false,
                first_published_at: None,
                last_published_at: None,
            },
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            intro: "intro".to_string(),
            body: String::new(),
            authors: Vec::new(),
            tags: vec!["python".to_string()],
            gallery_images,
        }
    }

    #[test]
    fn test_main_image_uses_lowest_sort_order() {
        let gallery = GalleryImages::from_unsorted(vec![
            gallery_item(1, 3, 2),
            gallery_item(2, 1, 0),
            gallery_item(3, 2, 1),
        ]);
        let page = post(gallery);

        assert_eq!(page.main_image().map(|i| i.id), Some(1));
        assert_eq!(page.main_image(), page.main_image());
        let order: Vec<_> = page.gallery_images.iter().map(|g| g.image.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_main_image_absent_without_gallery() {
        let page = post(GalleryImages::default());
        assert!(page.main_image().is_none());
        assert!(page.gallery_images.is_empty());
    }

    #[test]
    fn test_equal_sort_keys_keep_insertion_order() {
        let gallery = GalleryImages::from_unsorted(vec![gallery_item(1, 7, 0), gallery_item(2, 8, 0)]);
        assert_eq!(gallery.first().map(|g| g.image.id), Some(7));
    }

    #[test]
    fn test_serialized_post_exposes_main_image() {
        let page = post(GalleryImages::from_unsorted(vec![gallery_item(1, 5, 0)]));
        let value = serde_json::to_value(&page).unwrap();

        assert_eq!(value["main_image"]["id"], 5);
        assert_eq!(value["title"], "P");
        assert_eq!(value["date"], "2023-01-01");
        assert_eq!(value["gallery_images"].as_array().map(|a| a.len()), Some(1));
    }
}
