//! Configuration types for remote index clients.

/// Configuration for a remote index client.
#[derive(Debug, Clone)]
pub struct RemoteIndexConfig {
    /// Maximum number of records sent in a single bulk request.
    /// Larger batches are split into several requests.
    pub max_batch_size: usize,
}

impl Default for RemoteIndexConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
        }
    }
}

impl RemoteIndexConfig {
    /// Create a config with a custom bulk request size.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: max_batch_size.max(1),
        }
    }
}
