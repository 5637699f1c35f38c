// Schema definitions module - centralized schema registry

pub mod author_schema;
pub mod blog_schemas;
pub mod image_schema;
pub mod page_schema;

use crate::ent_schema::SchemaRegistry;

pub use author_schema::AuthorSchema;
pub use blog_schemas::{
    BlogIndexPageSchema, BlogPageGalleryImageSchema, BlogPageSchema, BlogPageTagSchema,
    BlogTagIndexPageSchema, TagSchema,
};
pub use image_schema::ImageSchema;
pub use page_schema::PageSchema;

/// Initialize and register all schemas
pub fn create_schema_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();

    registry.register::<PageSchema>();
    registry.register::<ImageSchema>();
    registry.register::<AuthorSchema>();
    registry.register::<TagSchema>();
    registry.register::<BlogIndexPageSchema>();
    registry.register::<BlogTagIndexPageSchema>();
    registry.register::<BlogPageSchema>();
    registry.register::<BlogPageTagSchema>();
    registry.register::<BlogPageGalleryImageSchema>();

    registry
}

/// Validate all registered schemas
pub fn validate_schemas() -> Result<(), Vec<String>> {
    let registry = create_schema_registry();
    registry.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ent_schema::{EdgeConstraint, PanelDefinition, SearchFieldKind, Widget};
    use crate::models::EntityType;

    #[test]
    fn test_registered_schemas_are_consistent() {
        assert_eq!(validate_schemas(), Ok(()));
    }

    #[test]
    fn test_blog_page_search_fields_extend_base() {
        let registry = create_schema_registry();
        let fields = registry.get_search_fields(&EntityType::BlogPage).unwrap();
        let searchable: Vec<_> = fields
            .iter()
            .filter(|f| f.kind == SearchFieldKind::Search)
            .map(|f| f.field_name.as_str())
            .collect();

        assert_eq!(searchable, vec!["title", "body", "intro"]);
    }

    #[test]
    fn test_blog_page_panels_group_blog_information() {
        let registry = create_schema_registry();
        let panels = registry.get_panels(&EntityType::BlogPage).unwrap();

        let PanelDefinition::MultiField { heading, children } = &panels[1] else {
            panic!("expected the blog information group, got {:?}", panels[1]);
        };
        assert_eq!(heading, "Blog information");
        assert!(children.contains(&PanelDefinition::field_with_widget(
            "authors",
            Widget::CheckboxSelectMultiple
        )));

        let names: Vec<_> = panels.iter().flat_map(|p| p.field_names()).collect();
        assert_eq!(
            names,
            vec!["title", "date", "authors", "tags", "intro", "body", "gallery_images"]
        );
    }

    #[test]
    fn test_on_delete_rules() {
        let registry = create_schema_registry();

        let author_edges = registry.get_edges(&EntityType::Author).unwrap();
        assert!(author_edges[0].has_constraint(&EdgeConstraint::DeleteSetNull));

        let gallery_edges = registry.get_edges(&EntityType::BlogPageGalleryImage).unwrap();
        assert!(gallery_edges
            .iter()
            .all(|e| e.has_constraint(&EdgeConstraint::DeleteCascade)));
    }

    #[test]
    fn test_intro_limit_enforced() {
        let registry = create_schema_registry();
        let ok = "a".repeat(250);
        let too_long = "a".repeat(251);

        assert!(registry.validate_text(EntityType::BlogPage, "intro", &ok).is_ok());
        assert!(registry.validate_text(EntityType::BlogPage, "intro", &too_long).is_err());
    }

    #[test]
    fn test_author_verbose_names() {
        let registry = create_schema_registry();
        let author = registry.get(&EntityType::Author).unwrap();
        assert_eq!(author.annotation("verbose_name_plural"), Some("Authors"));
    }
}
