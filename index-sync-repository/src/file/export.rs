//! JSON content export loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::StoreError;
use crate::memory::InMemoryItemSource;
use index_sync_shared::Item;

/// A snapshot of the content store written by an export job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentExport {
    #[serde(default)]
    pub items: Vec<Item>,
}

impl ContentExport {
    /// Read and parse an export file.
    ///
    /// The file holds a JSON object with an `items` array of tagged items
    /// (`{"kind": "post", ...}`).
    pub async fn read(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::io(format!("{}: {}", path.display(), e)))?;
        let export: ContentExport = serde_json::from_str(&raw)
            .map_err(|e| StoreError::parse(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), items = export.items.len(), "Loaded content export");
        Ok(export)
    }
}

/// Load a content export file into an in-memory item source.
pub async fn load_export(path: impl AsRef<Path>) -> Result<InMemoryItemSource, StoreError> {
    let export = ContentExport::read(path).await?;
    Ok(InMemoryItemSource::new(export.items))
}
