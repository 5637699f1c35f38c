// Blog schemas - index pages, posts and the post-owned tag and gallery associations

use super::page_schema::{base_content_panels, base_page_edges, base_page_fields, base_search_fields};
use crate::ent_schema::{
    EdgeConstraint, EdgeDefinition, EntSchema, FieldDefinition, FieldType, FieldValidator,
    PanelDefinition, SearchFieldDefinition, Widget,
};
use crate::models::EntityType;

pub const INTRO_MAX_LENGTH: usize = 250;
pub const CAPTION_MAX_LENGTH: usize = 250;
pub const TAG_NAME_MAX_LENGTH: usize = 100;

pub struct BlogIndexPageSchema;

impl EntSchema for BlogIndexPageSchema {
    fn entity_type() -> EntityType {
        EntityType::BlogIndexPage
    }

    fn fields() -> Vec<FieldDefinition> {
        let mut fields = base_page_fields();
        fields.push(FieldDefinition::new("intro", FieldType::RichText).optional());
        fields
    }

    fn edges() -> Vec<EdgeDefinition> {
        base_page_edges()
    }

    fn content_panels() -> Vec<PanelDefinition> {
        let mut panels = base_content_panels();
        panels.push(PanelDefinition::field_with_widget("intro", Widget::RichTextEditor));
        panels
    }

    fn search_fields() -> Vec<SearchFieldDefinition> {
        base_search_fields()
    }
}

pub struct BlogTagIndexPageSchema;

impl EntSchema for BlogTagIndexPageSchema {
    fn entity_type() -> EntityType {
        EntityType::BlogTagIndexPage
    }

    fn fields() -> Vec<FieldDefinition> {
        base_page_fields()
    }

    fn edges() -> Vec<EdgeDefinition> {
        base_page_edges()
    }

    fn content_panels() -> Vec<PanelDefinition> {
        base_content_panels()
    }

    fn search_fields() -> Vec<SearchFieldDefinition> {
        base_search_fields()
    }
}

pub struct BlogPageSchema;

impl EntSchema for BlogPageSchema {
    fn entity_type() -> EntityType {
        EntityType::BlogPage
    }

    fn fields() -> Vec<FieldDefinition> {
        let mut fields = base_page_fields();
        fields.extend([
            FieldDefinition::new("date", FieldType::Date).verbose_name("Post date"),
            FieldDefinition::new("intro", FieldType::String)
                .validate(FieldValidator::MaxLength(INTRO_MAX_LENGTH)),
            FieldDefinition::new("body", FieldType::RichText).optional(),
        ]);
        fields
    }

    fn edges() -> Vec<EdgeDefinition> {
        let mut edges = base_page_edges();
        edges.extend([
            EdgeDefinition::to("authors", EntityType::Author).many_to_many(),
            EdgeDefinition::to("tags", EntityType::BlogPageTag),
            EdgeDefinition::to("gallery_images", EntityType::BlogPageGalleryImage).ordered(),
        ]);
        edges
    }

    fn content_panels() -> Vec<PanelDefinition> {
        let mut panels = base_content_panels();
        panels.extend([
            PanelDefinition::multi(
                "Blog information",
                vec![
                    PanelDefinition::field_with_widget("date", Widget::DateInput),
                    PanelDefinition::field_with_widget("authors", Widget::CheckboxSelectMultiple),
                    PanelDefinition::field_with_widget("tags", Widget::TagInput),
                ],
            ),
            PanelDefinition::field("intro"),
            PanelDefinition::field_with_widget("body", Widget::RichTextEditor),
            PanelDefinition::inline(
                "gallery_images",
                vec![
                    PanelDefinition::field_with_widget("image", Widget::ImageChooser),
                    PanelDefinition::field("caption"),
                ],
            ),
        ]);
        panels
    }

    fn search_fields() -> Vec<SearchFieldDefinition> {
        let mut fields = base_search_fields();
        fields.extend([
            SearchFieldDefinition::search("body"),
            SearchFieldDefinition::search("intro"),
        ]);
        fields
    }
}

/// Shared tag vocabulary
pub struct TagSchema;

impl EntSchema for TagSchema {
    fn entity_type() -> EntityType {
        EntityType::Tag
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("name", FieldType::String)
                .validate(FieldValidator::MaxLength(TAG_NAME_MAX_LENGTH)),
            FieldDefinition::new("slug", FieldType::String)
                .validate(FieldValidator::MaxLength(TAG_NAME_MAX_LENGTH)),
        ]
    }
}

pub struct BlogPageTagSchema;

impl EntSchema for BlogPageTagSchema {
    fn entity_type() -> EntityType {
        EntityType::BlogPageTag
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("content_object", FieldType::ForeignKey(EntityType::BlogPage)),
            FieldDefinition::new("tag", FieldType::ForeignKey(EntityType::Tag)),
        ]
    }

    fn edges() -> Vec<EdgeDefinition> {
        vec![
            EdgeDefinition::from("content_object", EntityType::BlogPage, "tags")
                .required()
                .on_delete(EdgeConstraint::DeleteCascade),
            EdgeDefinition::from("tag", EntityType::Tag, "tagged_items")
                .required()
                .on_delete(EdgeConstraint::DeleteCascade),
        ]
    }
}

pub struct BlogPageGalleryImageSchema;

impl EntSchema for BlogPageGalleryImageSchema {
    fn entity_type() -> EntityType {
        EntityType::BlogPageGalleryImage
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("page", FieldType::ForeignKey(EntityType::BlogPage)),
            FieldDefinition::new("image", FieldType::ForeignKey(EntityType::Image)),
            FieldDefinition::new("caption", FieldType::String)
                .optional()
                .validate(FieldValidator::MaxLength(CAPTION_MAX_LENGTH)),
            FieldDefinition::new("sort_order", FieldType::Int64),
        ]
    }

    fn edges() -> Vec<EdgeDefinition> {
        vec![
            EdgeDefinition::from("page", EntityType::BlogPage, "gallery_images")
                .required()
                .on_delete(EdgeConstraint::DeleteCascade),
            // The association cannot outlive its image
            EdgeDefinition::from("image", EntityType::Image, "+")
                .required()
                .on_delete(EdgeConstraint::DeleteCascade),
        ]
    }

    fn content_panels() -> Vec<PanelDefinition> {
        vec![
            PanelDefinition::field_with_widget("image", Widget::ImageChooser),
            PanelDefinition::field("caption"),
        ]
    }
}
