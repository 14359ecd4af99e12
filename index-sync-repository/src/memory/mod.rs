//! In-memory implementations of the external collaborators.
//!
//! These keep everything in process and are used for tests, dry runs and
//! local development.

mod index_client;
mod item_source;
mod ledger;

pub use index_client::{InMemoryIndexClient, RemoteIndexState, RemoteOperation};
pub use item_source::InMemoryItemSource;
pub use ledger::InMemoryLedger;
