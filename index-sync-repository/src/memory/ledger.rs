//! In-memory records-count ledger.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::StoreError;
use crate::interfaces::RecordsCountLedger;

/// A `RecordsCountLedger` backed by a hash map.
#[derive(Default)]
pub struct InMemoryLedger {
    counts: Mutex<HashMap<(String, u64), u64>>,
    failing: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordsCountLedger for InMemoryLedger {
    async fn records_count(&self, index_id: &str, item_id: u64) -> Result<u64, StoreError> {
        Ok(self
            .counts
            .lock()
            .await
            .get(&(index_id.to_string(), item_id))
            .copied()
            .unwrap_or(0))
    }

    async fn set_records_count(
        &self,
        index_id: &str,
        item_id: u64,
        count: u64,
    ) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::io("simulated ledger write failure"));
        }
        self.counts
            .lock()
            .await
            .insert((index_id.to_string(), item_id), count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_are_scoped_per_index() {
        let ledger = InMemoryLedger::new();
        ledger.set_records_count("posts_post", 4, 3).await.unwrap();

        assert_eq!(ledger.records_count("posts_post", 4).await.unwrap(), 3);
        assert_eq!(ledger.records_count("searchable_posts", 4).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failing_write_keeps_previous_count() {
        let ledger = InMemoryLedger::new();
        ledger.set_records_count("posts_post", 4, 3).await.unwrap();

        ledger.set_failing(true);
        assert!(ledger.set_records_count("posts_post", 4, 1).await.is_err());
        assert_eq!(ledger.records_count("posts_post", 4).await.unwrap(), 3);
    }
}
