use crate::ent_schema::{EntSchema, FieldDefinition, FieldType, FieldValidator, PanelDefinition};
use crate::models::EntityType;

/// Image references held by the image store
pub struct ImageSchema;

impl EntSchema for ImageSchema {
    fn entity_type() -> EntityType {
        EntityType::Image
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("title", FieldType::String)
                .validate(FieldValidator::MaxLength(255)),
            FieldDefinition::new("file", FieldType::String)
                .validate(FieldValidator::MaxLength(100)),
        ]
    }

    fn content_panels() -> Vec<PanelDefinition> {
        vec![PanelDefinition::field("title"), PanelDefinition::field("file")]
    }
}
