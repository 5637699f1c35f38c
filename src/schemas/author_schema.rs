// Author snippet schema - reusable entity referenced by posts

use crate::ent_schema::{
    AnnotationDefinition, EdgeConstraint, EdgeDefinition, EntSchema, FieldDefinition, FieldType,
    FieldValidator, PanelDefinition, Widget,
};
use crate::models::EntityType;

pub const AUTHOR_NAME_MAX_LENGTH: usize = 100;

pub struct AuthorSchema;

impl EntSchema for AuthorSchema {
    fn entity_type() -> EntityType {
        EntityType::Author
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("name", FieldType::String)
                .validate(FieldValidator::MinLength(1))
                .validate(FieldValidator::MaxLength(AUTHOR_NAME_MAX_LENGTH)),
            FieldDefinition::new("author_image", FieldType::ForeignKey(EntityType::Image)).optional(),
        ]
    }

    fn edges() -> Vec<EdgeDefinition> {
        vec![
            // Deleting the image keeps the author
            EdgeDefinition::to("author_image", EntityType::Image)
                .on_delete(EdgeConstraint::DeleteSetNull),
        ]
    }

    fn content_panels() -> Vec<PanelDefinition> {
        vec![
            PanelDefinition::field("name"),
            PanelDefinition::field_with_widget("author_image", Widget::ImageChooser),
        ]
    }

    fn annotations() -> Vec<AnnotationDefinition> {
        vec![
            AnnotationDefinition::new("snippet", "true"),
            AnnotationDefinition::new("verbose_name", "Author"),
            AnnotationDefinition::new("verbose_name_plural", "Authors"),
        ]
    }
}
