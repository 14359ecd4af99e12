//! Dependency initialization and wiring for the synchronizer.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::{SiteCatalog, SyncConfig};
use crate::IndexingError;
use index_sync_engine::{IndexRegistry, RegistryDependencies};
use index_sync_repository::file::ContentExport;
use index_sync_repository::{
    InMemoryItemSource, JsonFileLedger, OpenSearchClient, RemoteIndexClient, RemoteIndexConfig,
};
use index_sync_shared::Synonym;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Every configured index, with its collaborators injected.
    pub registry: IndexRegistry,
    /// Post types and taxonomies found in the content export.
    pub catalog: SiteCatalog,
}

impl Dependencies {
    /// Initialize all dependencies against OpenSearch.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If a file cannot be read or the client cannot be created
    pub async fn new(config: &SyncConfig) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %config.opensearch_url,
            name_prefix = %config.name_prefix,
            batch_size = config.batch_size,
            "Initializing dependencies"
        );

        let client = OpenSearchClient::new(
            &config.opensearch_url,
            config.opensearch_credentials.clone(),
            RemoteIndexConfig::with_max_batch_size(config.max_bulk_size),
        )
        .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        Self::with_client(config, Arc::new(client)).await
    }

    /// Initialize the file-backed collaborators and build the registry around `client`.
    pub async fn with_client(
        config: &SyncConfig,
        client: Arc<dyn RemoteIndexClient>,
    ) -> Result<Self, IndexingError> {
        let export = ContentExport::read(&config.content_export_path).await?;
        let catalog = SiteCatalog::from_items(&export.items);
        let source = Arc::new(InMemoryItemSource::new(export.items));

        let ledger = JsonFileLedger::open(&config.records_ledger_path).await?;
        info!(path = %ledger.path().display(), "Records-count ledger opened");

        let synonyms = match &config.synonyms_path {
            Some(path) => load_synonyms(path).await?,
            None => HashMap::new(),
        };

        let registry_config = config.registry_config(catalog.clone(), synonyms);
        let registry = IndexRegistry::new(
            &registry_config,
            RegistryDependencies {
                client,
                source,
                ledger: Arc::new(ledger),
            },
        )?;

        Ok(Self { registry, catalog })
    }
}

/// Read a `{"<index_id>": [synonym, ...]}` file.
async fn load_synonyms(path: &Path) -> Result<HashMap<String, Vec<Synonym>>, IndexingError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let synonyms: HashMap<String, Vec<Synonym>> = serde_json::from_str(&raw).map_err(|e| {
        IndexingError::config(format!("Invalid synonyms file {}: {}", path.display(), e))
    })?;

    info!(path = %path.display(), indices = synonyms.len(), "Loaded synonyms");
    Ok(synonyms)
}
