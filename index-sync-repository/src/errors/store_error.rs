//! Content store error types.

use thiserror::Error;

/// Errors raised by the item source or the records-count ledger.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A query against the content store failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Reading or writing persisted state failed.
    #[error("IO error: {0}")]
    IoError(String),

    /// Persisted data could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl StoreError {
    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create an IO error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
