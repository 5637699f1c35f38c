// Search indexing - documents built from declared search fields and a pluggable backend

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use crate::ent_schema::{SchemaRegistry, SearchFieldKind};
use crate::error::{AppError, AppResult};
use crate::models::{EntityType, ObjectId};

const DEFAULT_BOOST: f32 = 1.0;
const AUTOCOMPLETE_BOOST: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchText {
    pub field_name: String,
    pub text: String,
    pub boost: f32,
}

/// What a backend stores for one record: only the fields its schema declares searchable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchDocument {
    pub entity_type: EntityType,
    pub id: ObjectId,
    pub title: String,
    pub url_path: String,
    pub searchable: Vec<SearchText>,
    pub autocomplete: Vec<String>,
    pub filters: BTreeMap<String, Value>,
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl SearchDocument {
    /// Builds the document for `record` from the search fields registered for `entity_type`.
    pub fn build<T: Serialize>(
        registry: &SchemaRegistry,
        entity_type: EntityType,
        record: &T,
    ) -> AppResult<Self> {
        let value = serde_json::to_value(record)
            .map_err(|e| AppError::Internal(format!("Failed to serialize {}: {}", entity_type.as_str(), e)))?;
        let fields = registry.get_search_fields(&entity_type).ok_or_else(|| {
            AppError::Internal(format!("No schema registered for {}", entity_type.as_str()))
        })?;

        let id = value
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| AppError::Internal(format!("{} record has no id", entity_type.as_str())))?;

        let mut document = SearchDocument {
            entity_type,
            id,
            title: value.get("title").and_then(value_text).unwrap_or_default(),
            url_path: value.get("url_path").and_then(value_text).unwrap_or_default(),
            searchable: Vec::new(),
            autocomplete: Vec::new(),
            filters: BTreeMap::new(),
        };

        for field in fields {
            let Some(field_value) = value.get(&field.field_name) else {
                continue;
            };
            match field.kind {
                SearchFieldKind::Search => {
                    if let Some(text) = value_text(field_value) {
                        document.searchable.push(SearchText {
                            field_name: field.field_name.clone(),
                            text,
                            boost: field.boost.unwrap_or(DEFAULT_BOOST),
                        });
                    }
                }
                SearchFieldKind::Autocomplete => {
                    if let Some(text) = value_text(field_value) {
                        document.autocomplete.push(text);
                    }
                }
                SearchFieldKind::Filter => {
                    document
                        .filters
                        .insert(field.field_name.clone(), field_value.clone());
                }
            }
        }

        Ok(document)
    }

    pub fn is_live(&self) -> bool {
        self.filters.get("live").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Relevance of this document for a lowercase query; zero means no match.
    fn score(&self, query: &str) -> f32 {
        let mut score = 0.0;
        for field in &self.searchable {
            if field.text.to_lowercase().contains(query) {
                score += field.boost;
            }
        }
        for text in &self.autocomplete {
            if text
                .to_lowercase()
                .split_whitespace()
                .any(|word| word.starts_with(query))
            {
                score += AUTOCOMPLETE_BOOST;
            }
        }
        score
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub entity_type: EntityType,
    pub id: ObjectId,
    pub title: String,
    pub url_path: String,
    pub score: f32,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn index(&self, document: SearchDocument) -> AppResult<()>;
    async fn remove(&self, entity_type: EntityType, id: ObjectId) -> AppResult<()>;
    /// Best matches first. Blank queries match nothing.
    async fn search(&self, query: &str, live_only: bool) -> AppResult<Vec<SearchHit>>;
}

/// Process-local backend with case-insensitive substring matching.
#[derive(Debug, Default)]
pub struct InMemorySearchBackend {
    documents: RwLock<HashMap<(EntityType, ObjectId), SearchDocument>>,
}

impl InMemorySearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl SearchBackend for InMemorySearchBackend {
    async fn index(&self, document: SearchDocument) -> AppResult<()> {
        debug!(entity = document.entity_type.as_str(), id = document.id, "Indexing document");
        self.documents
            .write()
            .await
            .insert((document.entity_type, document.id), document);
        Ok(())
    }

    async fn remove(&self, entity_type: EntityType, id: ObjectId) -> AppResult<()> {
        self.documents.write().await.remove(&(entity_type, id));
        Ok(())
    }

    async fn search(&self, query: &str, live_only: bool) -> AppResult<Vec<SearchHit>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut hits: Vec<SearchHit> = documents
            .values()
            .filter(|doc| !live_only || doc.is_live())
            .filter_map(|doc| {
                let score = doc.score(&query);
                (score > 0.0).then(|| SearchHit {
                    entity_type: doc.entity_type,
                    id: doc.id,
                    title: doc.title.clone(),
                    url_path: doc.url_path.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::create_schema_registry;
    use serde_json::json;

    fn post(id: i64, title: &str, body: &str, live: bool) -> Value {
        json!({
            "id": id,
            "title": title,
            "url_path": format!("/blog/{}/", id),
            "live": live,
            "intro": "",
            "body": body,
            "first_published_at": null,
            "last_published_at": null,
        })
    }

    #[test]
    fn test_document_uses_declared_fields() {
        let registry = create_schema_registry();
        let doc = SearchDocument::build(
            &registry,
            EntityType::BlogPage,
            &post(7, "Rust tips", "<p>borrowing</p>", true),
        )
        .unwrap();

        let names: Vec<_> = doc.searchable.iter().map(|t| t.field_name.as_str()).collect();
        assert_eq!(names, vec!["title", "body", "intro"]);
        assert_eq!(doc.searchable[0].boost, 2.0);
        assert_eq!(doc.autocomplete, vec!["Rust tips"]);
        assert_eq!(doc.filters.get("id"), Some(&json!(7)));
        assert!(doc.is_live());
    }

    #[tokio::test]
    async fn test_search_ranks_title_matches_first() {
        let registry = create_schema_registry();
        let backend = InMemorySearchBackend::new();
        for record in [
            post(1, "Cooking", "rust on a pan", true),
            post(2, "Rust tips", "", true),
            post(3, "Rust drafts", "", false),
        ] {
            let doc = SearchDocument::build(&registry, EntityType::BlogPage, &record).unwrap();
            backend.index(doc).await.unwrap();
        }

        let hits = backend.search("RUST", true).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let all = backend.search("rust", false).await.unwrap();
        assert_eq!(all.len(), 3);

        assert!(backend.search("   ", false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_drops_document() {
        let registry = create_schema_registry();
        let backend = InMemorySearchBackend::new();
        let doc = SearchDocument::build(&registry, EntityType::BlogPage, &post(4, "Gone", "", true)).unwrap();
        backend.index(doc).await.unwrap();
        backend.remove(EntityType::BlogPage, 4).await.unwrap();

        assert_eq!(backend.len().await, 0);
    }
}
