use super::{newest_first, validate_key, Collection, DocumentStore, StoredDocument};
use crate::error::{CourseError, CourseResult};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// One JSON file per document at `<root>/<collection>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    /// Open the store, creating a directory per collection
    pub async fn open(root: PathBuf) -> CourseResult<Self> {
        for collection in Collection::ALL {
            fs::create_dir_all(root.join(collection.as_str())).await?;
        }
        info!("📁 Document store initialized: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, collection: Collection, key: &str) -> CourseResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(collection.as_str()).join(format!("{}.json", key)))
    }

    async fn read_document(path: &Path) -> CourseResult<Option<StoredDocument>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let doc: StoredDocument = serde_json::from_str(&content)
            .map_err(|e| CourseError::Store(format!("corrupt document {}: {}", path.display(), e)))?;
        if doc.checksum != super::checksum(&doc.data) {
            warn!("Checksum mismatch for {}", path.display());
        }
        Ok(Some(doc))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, collection: Collection, key: &str) -> CourseResult<Option<StoredDocument>> {
        let path = self.path_for(collection, key)?;
        let doc = Self::read_document(&path).await?;
        debug!(
            "{} {}/{}",
            if doc.is_some() { "Store hit" } else { "Store miss" },
            collection,
            key
        );
        Ok(doc)
    }

    async fn set(&self, collection: Collection, key: &str, data: Value) -> CourseResult<StoredDocument> {
        let path = self.path_for(collection, key)?;
        let previous = Self::read_document(&path).await.ok().flatten();
        let doc = StoredDocument::new(collection, key, data, previous.as_ref());

        // Write then rename so readers never see a partial file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&doc)?).await?;
        fs::rename(&tmp, &path).await?;

        debug!("💾 Stored {}/{}", collection, key);
        Ok(doc)
    }

    async fn delete(&self, collection: Collection, key: &str) -> CourseResult<bool> {
        let path = self.path_for(collection, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("🗑️ Removed {}/{}", collection, key);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, collection: Collection, limit: usize) -> CourseResult<Vec<StoredDocument>> {
        let dir = self.root.join(collection.as_str());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut docs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                match Self::read_document(&path).await {
                    Ok(Some(doc)) => docs.push(doc),
                    Ok(None) => {}
                    Err(e) => warn!("Skipping {}: {}", path.display(), e),
                }
            }
        }

        Ok(newest_first(docs, limit))
    }

    async fn is_connected(&self) -> bool {
        fs::metadata(&self.root).await.map(|m| m.is_dir()).unwrap_or(false)
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
