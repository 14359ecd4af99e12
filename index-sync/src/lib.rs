//! # Index Sync
//!
//! Configuration, dependency wiring and operator commands for the index
//! synchronizer.
//!
//! The binary reads a content export and a records-count ledger from disk,
//! builds the configured indices and drives their re-index against OpenSearch.

pub mod commands;
pub mod config;

pub use commands::{list_indices, re_index, re_index_enabled, IndexStatus};
pub use config::{Dependencies, LogFormat, SiteCatalog, SyncConfig};

use index_sync_engine::IndexError;
use index_sync_repository::StoreError;
use thiserror::Error;

/// Errors that can occur during start-up or while running a command.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Index error.
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Content export or ledger error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
