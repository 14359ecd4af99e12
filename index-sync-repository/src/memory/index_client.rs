//! In-memory remote index client.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::RemoteIndexError;
use crate::interfaces::RemoteIndexClient;
use index_sync_shared::{IndexSettings, Record, Synonym};

/// A write issued against the in-memory client, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOperation {
    Upsert {
        index_name: String,
        object_ids: Vec<String>,
    },
    Delete {
        index_name: String,
        object_ids: Vec<String>,
    },
    SetSettings {
        index_name: String,
    },
    SetSynonyms {
        index_name: String,
    },
}

impl RemoteOperation {
    pub fn index_name(&self) -> &str {
        match self {
            Self::Upsert { index_name, .. }
            | Self::Delete { index_name, .. }
            | Self::SetSettings { index_name }
            | Self::SetSynonyms { index_name } => index_name,
        }
    }

    /// Whether the operation writes or removes records.
    pub fn is_object_write(&self) -> bool {
        matches!(self, Self::Upsert { .. } | Self::Delete { .. })
    }
}

/// Content of one in-memory index.
#[derive(Debug, Clone, Default)]
pub struct RemoteIndexState {
    pub objects: BTreeMap<String, Record>,
    pub settings: Option<IndexSettings>,
    pub synonyms: Vec<Synonym>,
}

/// A `RemoteIndexClient` that keeps every index in memory.
///
/// Every successful write is appended to an operation log. Writes can be made to
/// fail after a given number of successful calls to exercise error propagation.
#[derive(Default)]
pub struct InMemoryIndexClient {
    indices: Mutex<HashMap<String, RemoteIndexState>>,
    operations: Mutex<Vec<RemoteOperation>>,
    write_budget: Mutex<Option<usize>>,
}

impl InMemoryIndexClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `successful_writes` more writes through, then fail every following one.
    pub async fn fail_writes_after(&self, successful_writes: usize) {
        *self.write_budget.lock().await = Some(successful_writes);
    }

    /// Stop injecting failures.
    pub async fn restore_writes(&self) {
        *self.write_budget.lock().await = None;
    }

    /// The `objectID`s stored in `index_name`, in lexical order.
    pub async fn object_ids(&self, index_name: &str) -> Vec<String> {
        self.indices
            .lock()
            .await
            .get(index_name)
            .map(|index| index.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn record(&self, index_name: &str, object_id: &str) -> Option<Record> {
        self.indices
            .lock()
            .await
            .get(index_name)
            .and_then(|index| index.objects.get(object_id).cloned())
    }

    pub async fn settings(&self, index_name: &str) -> Option<IndexSettings> {
        self.indices
            .lock()
            .await
            .get(index_name)
            .and_then(|index| index.settings.clone())
    }

    pub async fn synonyms(&self, index_name: &str) -> Vec<Synonym> {
        self.indices
            .lock()
            .await
            .get(index_name)
            .map(|index| index.synonyms.clone())
            .unwrap_or_default()
    }

    /// Every successful write so far, in call order.
    pub async fn operations(&self) -> Vec<RemoteOperation> {
        self.operations.lock().await.clone()
    }

    pub async fn clear_operations(&self) {
        self.operations.lock().await.clear();
    }

    async fn check_write(&self) -> Result<(), RemoteIndexError> {
        let mut budget = self.write_budget.lock().await;
        match budget.as_mut() {
            Some(0) => Err(RemoteIndexError::connection("simulated network failure")),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn log(&self, operation: RemoteOperation) {
        debug!(operation = ?operation, "In-memory remote write");
        self.operations.lock().await.push(operation);
    }
}

fn require_object_id(record: &Record) -> Result<String, RemoteIndexError> {
    record
        .object_id()
        .map(str::to_string)
        .ok_or_else(|| RemoteIndexError::validation("record has no objectID"))
}

#[async_trait]
impl RemoteIndexClient for InMemoryIndexClient {
    async fn upsert(&self, index_name: &str, record: &Record) -> Result<(), RemoteIndexError> {
        self.upsert_many(index_name, std::slice::from_ref(record))
            .await
    }

    async fn upsert_many(
        &self,
        index_name: &str,
        records: &[Record],
    ) -> Result<(), RemoteIndexError> {
        let object_ids = records
            .iter()
            .map(require_object_id)
            .collect::<Result<Vec<_>, _>>()?;
        self.check_write().await?;

        {
            let mut indices = self.indices.lock().await;
            let index = indices.entry(index_name.to_string()).or_default();
            for (object_id, record) in object_ids.iter().zip(records) {
                index.objects.insert(object_id.clone(), record.clone());
            }
        }

        self.log(RemoteOperation::Upsert {
            index_name: index_name.to_string(),
            object_ids,
        })
        .await;
        Ok(())
    }

    async fn delete(&self, index_name: &str, object_id: &str) -> Result<(), RemoteIndexError> {
        self.delete_many(index_name, &[object_id.to_string()]).await
    }

    async fn delete_many(
        &self,
        index_name: &str,
        object_ids: &[String],
    ) -> Result<(), RemoteIndexError> {
        self.check_write().await?;

        if let Some(index) = self.indices.lock().await.get_mut(index_name) {
            for object_id in object_ids {
                index.objects.remove(object_id);
            }
        }

        self.log(RemoteOperation::Delete {
            index_name: index_name.to_string(),
            object_ids: object_ids.to_vec(),
        })
        .await;
        Ok(())
    }

    async fn set_settings(
        &self,
        index_name: &str,
        settings: &IndexSettings,
    ) -> Result<(), RemoteIndexError> {
        self.check_write().await?;
        self.indices
            .lock()
            .await
            .entry(index_name.to_string())
            .or_default()
            .settings = Some(settings.clone());

        self.log(RemoteOperation::SetSettings {
            index_name: index_name.to_string(),
        })
        .await;
        Ok(())
    }

    async fn set_synonyms(
        &self,
        index_name: &str,
        synonyms: &[Synonym],
    ) -> Result<(), RemoteIndexError> {
        self.check_write().await?;
        self.indices
            .lock()
            .await
            .entry(index_name.to_string())
            .or_default()
            .synonyms = synonyms.to_vec();

        self.log(RemoteOperation::SetSynonyms {
            index_name: index_name.to_string(),
        })
        .await;
        Ok(())
    }

    async fn exists(&self, index_name: &str) -> Result<bool, RemoteIndexError> {
        Ok(self
            .indices
            .lock()
            .await
            .get(index_name)
            .is_some_and(|index| !index.objects.is_empty()))
    }
}
