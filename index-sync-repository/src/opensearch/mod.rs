//! OpenSearch implementation of the remote index client.
//!
//! This module provides a concrete implementation of `RemoteIndexClient`
//! using OpenSearch as the hosted search service.

mod client;
mod index_config;

pub use client::OpenSearchClient;
pub use index_config::{index_body, META_KEY};
