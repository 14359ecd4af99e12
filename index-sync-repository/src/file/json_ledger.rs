//! Records-count ledger persisted to a JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::StoreError;
use crate::interfaces::RecordsCountLedger;

/// A `RecordsCountLedger` stored as a `{"<index_id>:<item_id>": count}` JSON map.
///
/// The whole map is rewritten on every change through a temporary file and a
/// rename, so a crash never leaves a truncated ledger behind.
pub struct JsonFileLedger {
    path: PathBuf,
    counts: Mutex<BTreeMap<String, u64>>,
}

impl JsonFileLedger {
    /// Open the ledger at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let counts = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::parse(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            counts: Mutex::new(counts),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key(index_id: &str, item_id: u64) -> String {
        format!("{}:{}", index_id, item_id)
    }

    async fn persist(&self, counts: &BTreeMap<String, u64>) -> Result<(), StoreError> {
        let raw = serde_json::to_vec_pretty(counts)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordsCountLedger for JsonFileLedger {
    async fn records_count(&self, index_id: &str, item_id: u64) -> Result<u64, StoreError> {
        Ok(self
            .counts
            .lock()
            .await
            .get(&Self::key(index_id, item_id))
            .copied()
            .unwrap_or(0))
    }

    async fn set_records_count(
        &self,
        index_id: &str,
        item_id: u64,
        count: u64,
    ) -> Result<(), StoreError> {
        let mut counts = self.counts.lock().await;
        let key = Self::key(index_id, item_id);
        let previous = if count == 0 {
            counts.remove(&key)
        } else {
            counts.insert(key.clone(), count)
        };

        if let Err(e) = self.persist(&counts).await {
            // Keep memory and disk in agreement.
            match previous {
                Some(previous) => counts.insert(key, previous),
                None => counts.remove(&key),
            };
            return Err(e);
        }

        debug!(index_id = %index_id, item_id = item_id, count = count, "Records count updated");
        Ok(())
    }
}
