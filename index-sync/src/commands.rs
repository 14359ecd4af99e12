//! Operator commands run by the binary.

use tracing::{info, instrument};

use crate::IndexingError;
use index_sync_engine::{Index, IndexRegistry, IndicesFilter, ReIndexProgress};

/// One line of the `list` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatus {
    pub id: String,
    pub admin_name: String,
    pub index_name: String,
    pub enabled: bool,
    pub exists: bool,
}

/// Describe every configured index, asking the remote store whether it exists.
pub async fn list_indices(registry: &IndexRegistry) -> Result<Vec<IndexStatus>, IndexingError> {
    let mut statuses = Vec::with_capacity(registry.all().len());
    for index in registry.all() {
        statuses.push(IndexStatus {
            id: index.id().to_string(),
            admin_name: index.admin_name(),
            index_name: index.index_name(),
            enabled: index.is_enabled(),
            exists: index.exists().await?,
        });
    }
    Ok(statuses)
}

/// Drive the re-index of one index from `from_page` until it reports completion.
#[instrument(skip(registry))]
pub async fn re_index(
    registry: &IndexRegistry,
    index_id: &str,
    from_page: u64,
) -> Result<ReIndexProgress, IndexingError> {
    let mut page = from_page;
    loop {
        let progress = registry.trigger_re_index(index_id, page).await?;
        info!(
            index_id = %index_id,
            page = progress.page,
            total_pages = progress.total_pages,
            "Re-index page done"
        );

        if progress.finished {
            return Ok(progress);
        }
        page += 1;
    }
}

/// Re-index every enabled index from its first page.
pub async fn re_index_enabled(
    registry: &IndexRegistry,
) -> Result<Vec<(String, ReIndexProgress)>, IndexingError> {
    let mut done = Vec::new();
    for index in registry.indices(IndicesFilter::enabled()) {
        let progress = re_index(registry, index.id(), 1).await?;
        done.push((index.id().to_string(), progress));
    }

    info!(indices = done.len(), "Re-indexed every enabled index");
    Ok(done)
}
