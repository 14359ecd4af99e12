//! Item source trait definition.

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::types::ItemFilter;
use index_sync_shared::Item;

/// Read access to the content store, one page at a time.
///
/// Implementations must return items in ascending id order so that items
/// appended while a re-index is running sort after the current page boundary and
/// no item is skipped or visited twice.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Count the items matching `filter`.
    ///
    /// Evaluated fresh on every call; the count may change between two pages.
    async fn count(&self, filter: &ItemFilter) -> Result<u64, StoreError>;

    /// Fetch page `page` (1-based) of at most `batch_size` items matching `filter`.
    ///
    /// A page past the end returns an empty list.
    async fn fetch(
        &self,
        filter: &ItemFilter,
        page: u64,
        batch_size: u64,
    ) -> Result<Vec<Item>, StoreError>;
}
