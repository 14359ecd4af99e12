//! Error types for the index synchronization engine.

use index_sync_repository::{RemoteIndexError, StoreError};
use thiserror::Error;

/// Errors that can occur while synchronizing an index.
///
/// Every error aborts the current unit of work (one item, or one re-index page)
/// and is handed back to the caller; nothing is retried or swallowed here.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The item does not belong to the index's category. This is a wiring bug.
    #[error("Index {index_id} does not support item {item}")]
    UnsupportedItem { index_id: String, item: String },

    /// Talking to the remote search service failed.
    #[error("Remote index error: {0}")]
    Remote(#[from] RemoteIndexError),

    /// Reading items or the records-count ledger failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Re-index pages start at 1.
    #[error("Invalid re-index page {0}, pages start at 1")]
    InvalidPage(u64),

    /// The index was used before a remote client was injected.
    #[error("No remote client configured for index {0}")]
    ClientNotSet(String),

    /// No index with this id is registered.
    #[error("Unknown index: {0}")]
    UnknownIndex(String),

    /// A record could not be built or is malformed.
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// The registry configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl IndexError {
    /// Create an unsupported item error.
    pub fn unsupported(index_id: impl Into<String>, item: impl Into<String>) -> Self {
        Self::UnsupportedItem {
            index_id: index_id.into(),
            item: item.into(),
        }
    }

    /// Create a mapping error.
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::Mapping(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether the error came from the remote search service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
