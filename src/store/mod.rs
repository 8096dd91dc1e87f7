//! Document store for playlists, analyses and generated courses and packages

pub mod file;
pub mod memory;
pub mod records;

pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;
pub use records::{PlaylistRecord, PlaylistSummary, VideoRecord};

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{CourseError, CourseResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Playlists,
    Analyses,
    Courses,
    /// Model analyses behind learning packages
    #[serde(rename = "content_analyses")]
    ContentAnalyses,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Playlists,
        Collection::Analyses,
        Collection::Courses,
        Collection::ContentAnalyses,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Playlists => "playlists",
            Collection::Analyses => "analyses",
            Collection::Courses => "courses",
            Collection::ContentAnalyses => "content_analyses",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored JSON document with its bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredDocument {
    pub key: String,
    pub collection: Collection,
    /// md5 of the serialized `data`
    pub checksum: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Value,
}

impl StoredDocument {
    /// Wrap `data`, keeping `created_at` from a previous version if there is one
    pub fn new(collection: Collection, key: &str, data: Value, previous: Option<&StoredDocument>) -> Self {
        let now = Utc::now();
        Self {
            key: key.to_string(),
            collection,
            checksum: checksum(&data),
            created_at: previous.map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
            data,
        }
    }

    fn text_field(&self, field: &str) -> &str {
        self.data.get(field).and_then(Value::as_str).unwrap_or("")
    }

    /// Case-insensitive substring match on `title` or `description`
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.text_field("title").to_lowercase().contains(&query)
            || self.text_field("description").to_lowercase().contains(&query)
    }
}

pub fn checksum(data: &Value) -> String {
    format!("{:x}", md5::compute(data.to_string().as_bytes()))
}

/// Keys become file names, so only a conservative alphabet is accepted
pub fn validate_key(key: &str) -> CourseResult<()> {
    let valid = !key.is_empty()
        && key.len() <= 200
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CourseError::Store(format!("invalid document key: {:?}", key)))
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, key: &str) -> CourseResult<Option<StoredDocument>>;

    /// Insert or replace a document
    async fn set(&self, collection: Collection, key: &str, data: Value) -> CourseResult<StoredDocument>;

    /// `true` when a document was removed
    async fn delete(&self, collection: Collection, key: &str) -> CourseResult<bool>;

    /// Most recently updated first
    async fn list(&self, collection: Collection, limit: usize) -> CourseResult<Vec<StoredDocument>>;

    async fn search(&self, collection: Collection, query: &str, limit: usize) -> CourseResult<Vec<StoredDocument>> {
        Ok(self
            .list(collection, usize::MAX)
            .await?
            .into_iter()
            .filter(|doc| doc.matches(query))
            .take(limit)
            .collect())
    }

    async fn is_connected(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

/// Newest first, then cut to `limit`
pub(crate) fn newest_first(mut docs: Vec<StoredDocument>, limit: usize) -> Vec<StoredDocument> {
    docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.key.cmp(&b.key)));
    docs.truncate(limit);
    docs
}

/// Build the configured store, or `None` when storage is disabled
pub async fn open_store(config: &StoreConfig) -> CourseResult<Option<Arc<dyn DocumentStore>>> {
    if !config.enabled {
        return Ok(None);
    }

    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::File => Arc::new(FileDocumentStore::open(config.dir.clone()).await?),
        StoreBackend::Memory => Arc::new(MemoryDocumentStore::new()),
    };
    Ok(Some(store))
}
