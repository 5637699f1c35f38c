// Base page schema - fields, panels and search fields every page-tree node carries

use crate::ent_schema::{
    EdgeConstraint, EdgeDefinition, EntSchema, FieldDefinition, FieldType, FieldValidator,
    PanelDefinition, SearchFieldDefinition,
};
use crate::models::EntityType;

pub const TITLE_MAX_LENGTH: usize = 255;
pub const SLUG_MAX_LENGTH: usize = 255;
pub const SLUG_PATTERN: &str = r"^[-\w]+$";

/// Plain page-tree node; also the schema of the tree root.
pub struct PageSchema;

pub fn base_page_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("id", FieldType::Int64).immutable(),
        FieldDefinition::new("title", FieldType::String)
            .validate(FieldValidator::MaxLength(TITLE_MAX_LENGTH)),
        FieldDefinition::new("slug", FieldType::String)
            .validate(FieldValidator::MaxLength(SLUG_MAX_LENGTH))
            .validate(FieldValidator::Pattern(SLUG_PATTERN.to_string())),
        FieldDefinition::new("url_path", FieldType::Text),
        FieldDefinition::new("live", FieldType::Bool),
        FieldDefinition::new("first_published_at", FieldType::Time).optional(),
        FieldDefinition::new("last_published_at", FieldType::Time).optional(),
    ]
}

pub fn base_page_edges() -> Vec<EdgeDefinition> {
    vec![EdgeDefinition::from("parent", EntityType::Page, "children")
        .on_delete(EdgeConstraint::DeleteCascade)]
}

pub fn base_content_panels() -> Vec<PanelDefinition> {
    vec![PanelDefinition::field("title")]
}

pub fn base_search_fields() -> Vec<SearchFieldDefinition> {
    vec![
        SearchFieldDefinition::search("title").boost(2.0),
        SearchFieldDefinition::autocomplete("title"),
        SearchFieldDefinition::filter("id"),
        SearchFieldDefinition::filter("live"),
        SearchFieldDefinition::filter("url_path"),
        SearchFieldDefinition::filter("first_published_at"),
        SearchFieldDefinition::filter("last_published_at"),
    ]
}

impl EntSchema for PageSchema {
    fn entity_type() -> EntityType {
        EntityType::Page
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
