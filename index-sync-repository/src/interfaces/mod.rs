//! Interface definitions for the synchronizer's external collaborators.
//!
//! This module defines the abstract traits that allow the remote search
//! service, the content store and the records-count ledger to be swapped for
//! other backends or for in-memory fakes.

mod item_source;
mod records_count_ledger;
mod remote_index_client;

pub use item_source::ItemSource;
pub use records_count_ledger::RecordsCountLedger;
pub use remote_index_client::RemoteIndexClient;
