//! Fragment bookkeeping shared by the post indices.

use std::sync::Arc;

use tracing::debug;

use super::IndexCore;
use crate::errors::IndexError;
use crate::mapper::post_object_id;
use index_sync_repository::RecordsCountLedger;
use index_sync_shared::Record;

/// Tracks how many fragment records each post owns and rewrites them as a unit.
///
/// Previous `objectID`s are rebuilt from the ledger count, so the count is only
/// advanced once the remote write went through.
#[derive(Clone)]
pub struct PostFragments {
    ledger: Arc<dyn RecordsCountLedger>,
}

impl PostFragments {
    pub fn new(ledger: Arc<dyn RecordsCountLedger>) -> Self {
        Self { ledger }
    }

    /// The `objectID`s `post_id` currently owns in the index.
    pub async fn known_object_ids(
        &self,
        core: &IndexCore,
        post_id: u64,
    ) -> Result<Vec<String>, IndexError> {
        let count = self.ledger.records_count(core.id(), post_id).await?;
        Ok((0..count).map(|i| post_object_id(post_id, i)).collect())
    }

    /// Delete every fragment the ledger knows for `post_id`.
    ///
    /// The ledger is left untouched; the next successful write resets it.
    pub async fn delete(&self, core: &IndexCore, post_id: u64) -> Result<(), IndexError> {
        let object_ids = self.known_object_ids(core, post_id).await?;
        if object_ids.is_empty() {
            return Ok(());
        }

        core.client()?
            .delete_many(&core.index_name(), &object_ids)
            .await?;

        debug!(
            index_id = %core.id(),
            post_id = post_id,
            count = object_ids.len(),
            "Post fragments deleted"
        );
        Ok(())
    }

    /// Replace the fragments of `post_id` with `records`.
    ///
    /// Old fragments are always deleted first, since the new set may be smaller.
    /// An empty `records` leaves the post with no fragments.
    pub async fn replace(
        &self,
        core: &IndexCore,
        post_id: u64,
        records: &[Record],
    ) -> Result<(), IndexError> {
        if records.iter().any(|record| record.object_id().is_none()) {
            return Err(IndexError::mapping(format!(
                "fragment of post {} has no objectID",
                post_id
            )));
        }

        self.delete(core, post_id).await?;

        if !records.is_empty() {
            core.client()?
                .upsert_many(&core.index_name(), records)
                .await?;
        }

        self.ledger
            .set_records_count(core.id(), post_id, records.len() as u64)
            .await?;

        debug!(
            index_id = %core.id(),
            post_id = post_id,
            count = records.len(),
            "Post fragments replaced"
        );
        Ok(())
    }
}
