//! # Index Sync Repository
//!
//! This crate provides the traits and implementations of the synchronizer's
//! external collaborators: the hosted search service, the content store and the
//! records-count ledger. It includes an OpenSearch implementation of the remote
//! client, in-memory implementations of all three, and file-backed sources for
//! running against a content export.

pub mod config;
pub mod errors;
pub mod file;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod types;

pub use config::RemoteIndexConfig;
pub use errors::{RemoteIndexError, StoreError};
pub use file::{load_export, JsonFileLedger};
pub use interfaces::{ItemSource, RecordsCountLedger, RemoteIndexClient};
pub use memory::{InMemoryIndexClient, InMemoryItemSource, InMemoryLedger, RemoteOperation};
pub use opensearch::OpenSearchClient;
pub use types::ItemFilter;
