//! # Index Sync Engine
//!
//! This crate keeps hosted search indices in sync with a content store.
//!
//! ## Architecture
//!
//! 1. **Mapper**: Turns posts, terms and users into flat records; a post fans
//!    out into one record per content fragment
//! 2. **Index**: Decides membership, writes and deletes records, and drives the
//!    paginated re-index
//! 3. **Registry**: Builds the configured indices once at start-up
//! 4. **Watcher**: Routes content-store mutations to the indices

pub mod errors;
pub mod index;
pub mod mapper;
pub mod registry;
pub mod watcher;

pub use errors::IndexError;
pub use index::{Index, IndexCore, ReIndexProgress, SyncIndex};
pub use registry::{IndexRegistry, IndicesFilter, PostType, RegistryConfig, RegistryDependencies};
pub use watcher::{ChangeDispatcher, ChangeHook, ChangeKind, ChangeWatcher};
