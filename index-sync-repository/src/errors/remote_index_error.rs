//! Remote index error types.
//!
//! This module defines the errors raised while talking to the hosted search
//! service. None of them are retried by the synchronizer.

use thiserror::Error;

/// Errors that can occur while talking to the remote search service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteIndexError {
    /// The search service could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The credentials were rejected.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The search service answered with an unexpected status.
    #[error("Request failed with status {status}: {body}")]
    RequestError { status: u16, body: String },

    /// A record or settings document could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The request was rejected before being sent (e.g. a record without `objectID`).
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl RemoteIndexError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an authentication error.
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::AuthenticationError(msg.into())
    }

    /// Create a request error from a response status and body.
    pub fn request(status: u16, body: impl Into<String>) -> Self {
        Self::RequestError {
            status,
            body: body.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Map a non-success HTTP status to the matching error.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::AuthenticationError(body.into()),
            _ => Self::request(status, body),
        }
    }
}

impl From<serde_json::Error> for RemoteIndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
