//! Records-count ledger trait definition.

use async_trait::async_trait;

use crate::errors::StoreError;

/// Persists how many records each item currently owns in an index.
///
/// Fan-out indices rebuild the `objectID`s of an item's previous records from
/// this count, so it must only be advanced after the remote write succeeded.
#[async_trait]
pub trait RecordsCountLedger: Send + Sync {
    /// The last recorded count for `item_id` in `index_id`, or `0` if none.
    async fn records_count(&self, index_id: &str, item_id: u64) -> Result<u64, StoreError>;

    /// Record that `item_id` now owns `count` records in `index_id`.
    async fn set_records_count(
        &self,
        index_id: &str,
        item_id: u64,
        count: u64,
    ) -> Result<(), StoreError>;
}
