use super::{newest_first, validate_key, Collection, DocumentStore, StoredDocument};
use crate::error::CourseResult;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process store, used by tests and `backend = "memory"`
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<HashMap<(Collection, String), StoredDocument>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: Collection, key: &str) -> CourseResult<Option<StoredDocument>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&(collection, key.to_string())).cloned())
    }

    async fn set(&self, collection: Collection, key: &str, data: Value) -> CourseResult<StoredDocument> {
        validate_key(key)?;
        let mut documents = self.documents.write().await;
        let slot = (collection, key.to_string());
        let doc = StoredDocument::new(collection, key, data, documents.get(&slot));
        documents.insert(slot, doc.clone());
        Ok(doc)
    }

    async fn delete(&self, collection: Collection, key: &str) -> CourseResult<bool> {
        let mut documents = self.documents.write().await;
        Ok(documents.remove(&(collection, key.to_string())).is_some())
    }

    async fn list(&self, collection: Collection, limit: usize) -> CourseResult<Vec<StoredDocument>> {
        let documents = self.documents.read().await;
        let docs = documents
            .values()
            .filter(|doc| doc.collection == collection)
            .cloned()
            .collect();
        Ok(newest_first(docs, limit))
    }

    async fn is_connected(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_basics() {
        let store = MemoryDocumentStore::new();
        assert!(store.is_empty().await);

        let first = store.set(Collection::Analyses, "PL1", json!({"score": 1})).await.unwrap();
        let second = store.set(Collection::Analyses, "PL1", json!({"score": 2})).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(second.created_at, first.created_at);

        let doc = store.get(Collection::Analyses, "PL1").await.unwrap().unwrap();
        assert_eq!(doc.data["score"], 2);
        assert!(store.list(Collection::Playlists, 10).await.unwrap().is_empty());

        assert!(store.delete(Collection::Analyses, "PL1").await.unwrap());
        assert!(store.get(Collection::Analyses, "PL1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_documents() {
        let store = MemoryDocumentStore::new();
        let other = store.clone();
        store.set(Collection::Courses, "c1", json!({"title": "Shared"})).await.unwrap();
        assert_eq!(other.search(Collection::Courses, "shared", 5).await.unwrap().len(), 1);
    }
}
