//! Error types for the synchronizer's external collaborators.

mod remote_index_error;
mod store_error;

pub use remote_index_error::RemoteIndexError;
pub use store_error::StoreError;
