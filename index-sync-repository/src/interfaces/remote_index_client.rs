//! Remote index client trait definition.
//!
//! This module defines the abstract interface for writing to the hosted search
//! service, allowing for different backend implementations.

use async_trait::async_trait;

use crate::errors::RemoteIndexError;
use index_sync_shared::{IndexSettings, Record, Synonym};

/// Abstract interface for the hosted search service.
///
/// Every operation addresses a physical index by name (prefix included). Writes are
/// keyed by `objectID`, so replaying the same upsert or delete is harmless.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow sharing one client between
/// every index of the registry.
///
/// # Error Handling
///
/// All methods return `Result<T, RemoteIndexError>`. Implementations must not
/// retry internally; the caller decides whether to replay the unit of work.
#[async_trait]
pub trait RemoteIndexClient: Send + Sync {
    /// Create or replace one record.
    ///
    /// # Arguments
    ///
    /// * `index_name` - The physical index name
    /// * `record` - The record to store, keyed by its `objectID`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the record was stored
    /// * `Err(RemoteIndexError::ValidationError)` - If the record has no `objectID`
    /// * `Err(RemoteIndexError)` - If the request fails
    async fn upsert(&self, index_name: &str, record: &Record) -> Result<(), RemoteIndexError>;

    /// Create or replace several records in one request.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every record was stored
    /// * `Err(RemoteIndexError)` - If the request or any of its items fails
    async fn upsert_many(&self, index_name: &str, records: &[Record])
        -> Result<(), RemoteIndexError>;

    /// Delete one record.
    ///
    /// Deleting a record that does not exist succeeds.
    async fn delete(&self, index_name: &str, object_id: &str) -> Result<(), RemoteIndexError>;

    /// Delete several records in one request.
    ///
    /// Records that do not exist are ignored.
    async fn delete_many(&self, index_name: &str, object_ids: &[String])
        -> Result<(), RemoteIndexError>;

    /// Replace the ranking, faceting and snippet configuration of the index.
    ///
    /// Creates the index if it does not exist yet.
    async fn set_settings(
        &self,
        index_name: &str,
        settings: &IndexSettings,
    ) -> Result<(), RemoteIndexError>;

    /// Replace the synonym rules of the index.
    ///
    /// Creates the index if it does not exist yet.
    async fn set_synonyms(&self, index_name: &str, synonyms: &[Synonym])
        -> Result<(), RemoteIndexError>;

    /// Whether the index currently holds at least one record.
    async fn exists(&self, index_name: &str) -> Result<bool, RemoteIndexError>;
}
