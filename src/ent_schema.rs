// Ent Schema Framework - declarative entity schemas for the blog content model
// Fields, validators, edges, admin panels and search fields are plain data, read by the stores and the admin/search layers

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::EntityType;

/// Schema definition trait
pub trait EntSchema: Send + Sync {
    /// Entity type this schema defines
    fn entity_type() -> EntityType
    where
        Self: Sized;

    /// Define fields for this entity
    fn fields() -> Vec<FieldDefinition>
    where
        Self: Sized;

    /// Define edges (relationships) for this entity
    fn edges() -> Vec<EdgeDefinition>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Editing surface exposed to the admin interface
    fn content_panels() -> Vec<PanelDefinition>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Fields handed to the search indexer
    fn search_fields() -> Vec<SearchFieldDefinition>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Define annotations for this entity
    fn annotations() -> Vec<AnnotationDefinition>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

/// Field definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    pub optional: bool,
    pub immutable: bool,
    pub verbose_name: Option<String>,
    pub validators: Vec<FieldValidator>,
}

impl FieldDefinition {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            optional: false,
            immutable: false,
            verbose_name: None,
            validators: Vec::new(),
        }
    }

    /// Mark field as optional (blank allowed)
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark field as immutable (can't be updated after creation)
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Human label shown by the admin interface
    pub fn verbose_name(mut self, label: &str) -> Self {
        self.verbose_name = Some(label.to_string());
        self
    }

    /// Add field validator
    pub fn validate(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Check a text value against this field's rules.
    /// A single-line string holding only whitespace counts as blank.
    pub fn check_text(&self, value: &str) -> Result<(), String> {
        let blank = match self.field_type {
            FieldType::String => value.trim().is_empty(),
            _ => value.is_empty(),
        };
        if blank {
            if self.optional {
                return Ok(());
            }
            return Err(format!("{} is required", self.name));
        }

        for validator in &self.validators {
            validator.check(&self.name, value)?;
        }
        Ok(())
    }
}

/// Field types supported by the content model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Text,
    RichText,
    Int64,
    Bool,
    Date,
    Time,
    ForeignKey(EntityType),
}

/// Compiled validator patterns, keyed by pattern source.
static PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(Default::default);

fn compiled_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    if let Some(re) = PATTERNS.read().ok().and_then(|cache| cache.get(pattern).cloned()) {
        return Ok(re);
    }

    let re = Regex::new(pattern)?;
    if let Ok(mut cache) = PATTERNS.write() {
        cache.insert(pattern.to_string(), re.clone());
    }
    Ok(re)
}

/// Field validators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldValidator {
    /// Counted in characters, surrounding whitespace excluded.
    MinLength(usize),
    /// Counted in characters, not bytes.
    MaxLength(usize),
    Pattern(String),
}

impl FieldValidator {
    pub fn check(&self, field: &str, value: &str) -> Result<(), String> {
        match self {
            FieldValidator::MinLength(min) => {
                let len = value.trim().chars().count();
                if len < *min {
                    return Err(format!("{} must be at least {} characters (got {})", field, min, len));
                }
            }
            FieldValidator::MaxLength(max) => {
                let len = value.chars().count();
                if len > *max {
                    return Err(format!("{} must be at most {} characters (got {})", field, max, len));
                }
            }
            FieldValidator::Pattern(pattern) => {
                let re = compiled_pattern(pattern)
                    .map_err(|e| format!("invalid pattern for {}: {}", field, e))?;
                if !re.is_match(value) {
                    return Err(format!("{} has an invalid format", field));
                }
            }
        }
        Ok(())
    }
}

/// Edge definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub name: String,
    pub target_entity: EntityType,
    pub edge_type: EdgeType,
    pub cardinality: EdgeCardinality,
    pub required: bool,
    pub ordered: bool,
    pub inverse_name: Option<String>,
    pub constraints: Vec<EdgeConstraint>,
}

impl EdgeDefinition {
    /// Create an edge to another entity (owner side)
    pub fn to(name: &str, target: EntityType) -> Self {
        Self {
            name: name.to_string(),
            target_entity: target,
            edge_type: EdgeType::To,
            cardinality: EdgeCardinality::OneToMany,
            required: false,
            ordered: false,
            inverse_name: None,
            constraints: Vec::new(),
        }
    }

    /// Create an edge from another entity (back-reference)
    pub fn from(name: &str, target: EntityType, inverse_edge: &str) -> Self {
        Self {
            name: name.to_string(),
            target_entity: target,
            edge_type: EdgeType::From,
            cardinality: EdgeCardinality::ManyToOne,
            required: false,
            ordered: false,
            inverse_name: Some(inverse_edge.to_string()),
            constraints: Vec::new(),
        }
    }

    pub fn many_to_many(mut self) -> Self {
        self.cardinality = EdgeCardinality::ManyToMany;
        self
    }

    /// Mark edge as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Children keep an explicit sort key
    pub fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    pub fn on_delete(mut self, constraint: EdgeConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn has_constraint(&self, constraint: &EdgeConstraint) -> bool {
        self.constraints.contains(constraint)
    }
}

/// Edge types - direction of relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeType {
    To,   // This entity owns the relationship
    From, // This entity is referenced by the relationship
}

/// Edge cardinality - relationship multiplicity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeCardinality {
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// What happens to this side when the edge target is deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeConstraint {
    DeleteCascade,
    DeleteSetNull,
}

/// Input affordance for a panel field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    RichTextEditor,
    DateInput,
    CheckboxSelectMultiple,
    TagInput,
    ImageChooser,
}

/// Admin editing surface, declared as data rather than derived from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum PanelDefinition {
    Field {
        field_name: String,
        widget: Option<Widget>,
    },
    MultiField {
        heading: String,
        children: Vec<PanelDefinition>,
    },
    /// Ordered child collection edited inline with its parent.
    Inline {
        relation_name: String,
        panels: Vec<PanelDefinition>,
    },
}

impl PanelDefinition {
    pub fn field(name: &str) -> Self {
        PanelDefinition::Field {
            field_name: name.to_string(),
            widget: None,
        }
    }

    pub fn field_with_widget(name: &str, widget: Widget) -> Self {
        PanelDefinition::Field {
            field_name: name.to_string(),
            widget: Some(widget),
        }
    }

    pub fn multi(heading: &str, children: Vec<PanelDefinition>) -> Self {
        PanelDefinition::MultiField {
            heading: heading.to_string(),
            children,
        }
    }

    pub fn inline(relation_name: &str, panels: Vec<PanelDefinition>) -> Self {
        PanelDefinition::Inline {
            relation_name: relation_name.to_string(),
            panels,
        }
    }

    /// Field and relation names this panel edits, depth first.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            PanelDefinition::Field { field_name, .. } => vec![field_name.as_str()],
            PanelDefinition::MultiField { children, .. } => {
                children.iter().flat_map(|c| c.field_names()).collect()
            }
            PanelDefinition::Inline { relation_name, .. } => vec![relation_name.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFieldKind {
    /// Full-text searchable
    Search,
    /// Prefix matching while typing
    Autocomplete,
    /// Exact filtering only
    Filter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFieldDefinition {
    pub field_name: String,
    pub kind: SearchFieldKind,
    pub boost: Option<f32>,
}

impl SearchFieldDefinition {
    pub fn search(name: &str) -> Self {
        Self {
            field_name: name.to_string(),
            kind: SearchFieldKind::Search,
            boost: None,
        }
    }

    pub fn autocomplete(name: &str) -> Self {
        Self {
            field_name: name.to_string(),
            kind: SearchFieldKind::Autocomplete,
            boost: None,
        }
    }

    pub fn filter(name: &str) -> Self {
        Self {
            field_name: name.to_string(),
            kind: SearchFieldKind::Filter,
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }
}

/// Annotation definition for metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDefinition {
    pub name: String,
    pub value: String,
}

impl AnnotationDefinition {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Everything declared for one entity type
#[derive(Debug, Clone, Serialize)]
pub struct EntityDeclaration {
    pub entity_type: EntityType,
    pub fields: Vec<FieldDefinition>,
    pub edges: Vec<EdgeDefinition>,
    pub content_panels: Vec<PanelDefinition>,
    pub search_fields: Vec<SearchFieldDefinition>,
    pub annotations: Vec<AnnotationDefinition>,
}

impl EntityDeclaration {
    pub fn annotation(&self, name: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Schema registry - holds all defined schemas
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    declarations: HashMap<EntityType, EntityDeclaration>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema
    pub fn register<T: EntSchema + 'static>(&mut self) {
        let entity_type = T::entity_type();
        self.declarations.insert(
            entity_type,
            EntityDeclaration {
                entity_type,
                fields: T::fields(),
                edges: T::edges(),
                content_panels: T::content_panels(),
                search_fields: T::search_fields(),
                annotations: T::annotations(),
            },
        );
    }

    pub fn get(&self, entity_type: &EntityType) -> Option<&EntityDeclaration> {
        self.declarations.get(entity_type)
    }

    /// Get field definitions for an entity
    pub fn get_fields(&self, entity_type: &EntityType) -> Option<&Vec<FieldDefinition>> {
        self.declarations.get(entity_type).map(|d| &d.fields)
    }

    /// Get edge definitions for an entity
    pub fn get_edges(&self, entity_type: &EntityType) -> Option<&Vec<EdgeDefinition>> {
        self.declarations.get(entity_type).map(|d| &d.edges)
    }

    pub fn get_panels(&self, entity_type: &EntityType) -> Option<&Vec<PanelDefinition>> {
        self.declarations.get(entity_type).map(|d| &d.content_panels)
    }

    pub fn get_search_fields(&self, entity_type: &EntityType) -> Option<&Vec<SearchFieldDefinition>> {
        self.declarations.get(entity_type).map(|d| &d.search_fields)
    }

    pub fn get_field(&self, entity_type: &EntityType, field: &str) -> Option<&FieldDefinition> {
        self.get_fields(entity_type)?.iter().find(|f| f.name == field)
    }

    /// Write-boundary check of a text value against its declared field.
    pub fn validate_text(&self, entity_type: EntityType, field: &str, value: &str) -> AppResult<()> {
        let definition = self.get_field(&entity_type, field).ok_or_else(|| {
            AppError::Internal(format!("{} has no field '{}'", entity_type.as_str(), field))
        })?;

        definition.check_text(value).map_err(|msg| {
            tracing::debug!(entity = entity_type.as_str(), field, "rejected value: {}", msg);
            AppError::Validation(msg)
        })
    }

    /// Validate schema consistency
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (entity_type, declaration) in &self.declarations {
            for edge in &declaration.edges {
                // Check if target entity exists
                if !self.declarations.contains_key(&edge.target_entity) {
                    errors.push(format!(
                        "Entity {:?} has edge '{}' pointing to undefined entity {:?}",
                        entity_type, edge.name, edge.target_entity
                    ));
                }

                if edge.has_constraint(&EdgeConstraint::DeleteSetNull) && edge.required {
                    errors.push(format!(
                        "Required edge '{}' on {:?} cannot be nulled on delete",
                        edge.name, entity_type
                    ));
                }
            }

            // Every panel must point at a declared field or edge
            for panel in &declaration.content_panels {
                for name in panel.field_names() {
                    let known = declaration.fields.iter().any(|f| f.name == name)
                        || declaration.edges.iter().any(|e| e.name == name);
                    if !known {
                        errors.push(format!(
                            "Panel on {:?} references unknown field '{}'",
                            entity_type, name
                        ));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_length_counts_characters() {
        let field = FieldDefinition::new("intro", FieldType::String)
            .validate(FieldValidator::MaxLength(3));

        assert!(field.check_text("äöü").is_ok());
        assert!(field.check_text("äöüß").is_err());
    }

    #[test]
    fn test_required_and_optional_empty_values() {
        let required = FieldDefinition::new("name", FieldType::String);
        let optional = FieldDefinition::new("caption", FieldType::String).optional();

        assert!(required.check_text("").is_err());
        assert!(optional.check_text("").is_ok());
    }

    #[test]
    fn test_pattern_validator() {
        let field = FieldDefinition::new("slug", FieldType::String)
            .validate(FieldValidator::Pattern(r"^[-\w]+$".to_string()));

        assert!(field.check_text("hello-world_2").is_ok());
        assert!(field.check_text("hello world").is_err());
        assert!(PATTERNS.read().unwrap().contains_key(r"^[-\w]+$"));
    }

    #[test]
    fn test_pattern_is_compiled_once() {
        let first = compiled_pattern(r"^\d{4}$").unwrap();
        let second = compiled_pattern(r"^\d{4}$").unwrap();

        assert_eq!(first.as_str(), second.as_str());
        assert_eq!(
            PATTERNS.read().unwrap().keys().filter(|k| k.as_str() == r"^\d{4}$").count(),
            1
        );
    }

    #[test]
    fn test_whitespace_only_string_is_blank() {
        let name = FieldDefinition::new("name", FieldType::String)
            .validate(FieldValidator::MinLength(1));
        let body = FieldDefinition::new("body", FieldType::RichText).optional();

        assert_eq!(name.check_text("   "), Err("name is required".to_string()));
        assert!(name.check_text("  Ada ").is_ok());
        assert!(body.check_text("   ").is_ok());

        let slug = FieldDefinition::new("slug", FieldType::String)
            .validate(FieldValidator::Pattern(r"^[-\w]+$".to_string()));
        assert!(slug.check_text(" blog").is_err());
    }

    #[test]
    fn test_panel_field_names_flatten_groups() {
        let panel = PanelDefinition::multi(
            "Blog information",
            vec![
                PanelDefinition::field("date"),
                PanelDefinition::field_with_widget("authors", Widget::CheckboxSelectMultiple),
            ],
        );
        assert_eq!(panel.field_names(), vec!["date", "authors"]);
    }
}
