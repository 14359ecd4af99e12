//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `RemoteIndexClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesGetMappingParts, IndicesPutMappingParts},
    BulkOperation, BulkParts, CountParts, DeleteParts, IndexParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::RemoteIndexConfig;
use crate::errors::RemoteIndexError;
use crate::interfaces::RemoteIndexClient;
use crate::opensearch::index_config::{index_body, merge_meta};
use index_sync_shared::{IndexSettings, Record, Synonym};

/// OpenSearch client implementation.
///
/// Records are stored as documents whose `_id` is the record's `objectID`.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200", None, RemoteIndexConfig::default())?;
/// client.upsert("wp_users", &Record::new("1").with("display_name", "Ada")).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    config: RemoteIndexConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `credentials` - Optional basic-auth user name and password
    /// * `config` - Bulk request sizing
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(RemoteIndexError)` - If the URL is invalid or transport setup fails
    pub fn new(
        url: &str,
        credentials: Option<(String, String)>,
        config: RemoteIndexConfig,
    ) -> Result<Self, RemoteIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| RemoteIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some((user, password)) = credentials {
            builder = builder.auth(Credentials::Basic(user, password));
        }
        let transport = builder
            .build()
            .map_err(|e| RemoteIndexError::connection(e.to_string()))?;

        info!(
            url = %url,
            max_batch_size = config.max_batch_size,
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            config,
        })
    }

    /// Turn a non-success response into an error. A 404 passes when `allow_not_found` is set.
    async fn check(
        response: Response,
        allow_not_found: bool,
    ) -> Result<Response, RemoteIndexError> {
        let status = response.status_code();
        if status.is_success() || (allow_not_found && status.as_u16() == 404) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "OpenSearch request failed");
        Err(RemoteIndexError::from_status(status.as_u16(), body))
    }

    /// Collect the per-item failures of a bulk response.
    ///
    /// Deleting a missing document reports a 404 item, which is not a failure.
    fn bulk_failures(body: &Value) -> Vec<String> {
        if !body["errors"].as_bool().unwrap_or(false) {
            return Vec::new();
        }

        body["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_object()?.iter().next())
                    .filter_map(|(action, result)| {
                        let status = result["status"].as_u64().unwrap_or(0);
                        let missing_delete = action == "delete" && status == 404;
                        if status < 300 || missing_delete {
                            return None;
                        }
                        Some(format!(
                            "{} {}: {}",
                            action,
                            result["_id"].as_str().unwrap_or("?"),
                            result["error"]
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn send_bulk(
        &self,
        index_name: &str,
        operations: Vec<BulkOperation<Value>>,
    ) -> Result<(), RemoteIndexError> {
        let count = operations.len();
        let response = self
            .client
            .bulk(BulkParts::Index(index_name))
            .body(operations)
            .send()
            .await
            .map_err(|e| RemoteIndexError::connection(e.to_string()))?;
        let response = Self::check(response, false).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| RemoteIndexError::serialization(e.to_string()))?;
        let failures = Self::bulk_failures(&body);
        if !failures.is_empty() {
            error!(index = %index_name, failed = failures.len(), "Bulk request had failures");
            return Err(RemoteIndexError::request(207, failures.join("; ")));
        }

        debug!(index = %index_name, count = count, "Bulk request applied");
        Ok(())
    }

    /// Create the physical index if it does not exist yet.
    async fn ensure_index(&self, index_name: &str) -> Result<(), RemoteIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index_name]))
            .send()
            .await
            .map_err(|e| RemoteIndexError::connection(e.to_string()))?;
        if response.status_code().is_success() {
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index_name))
            .body(index_body())
            .send()
            .await
            .map_err(|e| RemoteIndexError::connection(e.to_string()))?;
        Self::check(response, false).await?;

        info!(index = %index_name, "Created index");
        Ok(())
    }

    /// Store `value` under one section of the index's `_meta`.
    async fn put_meta_section(
        &self,
        index_name: &str,
        section: &str,
        value: Value,
    ) -> Result<(), RemoteIndexError> {
        self.ensure_index(index_name).await?;

        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index_name]))
            .send()
            .await
            .map_err(|e| RemoteIndexError::connection(e.to_string()))?;
        let mapping: Value = Self::check(response, false)
            .await?
            .json()
            .await
            .map_err(|e| RemoteIndexError::serialization(e.to_string()))?;
        // The response is keyed by the concrete index name, which differs from
        // `index_name` when it is an alias.
        let current_meta = mapping
            .as_object()
            .and_then(|indices| indices.values().next())
            .and_then(|index| index.get("mappings"))
            .and_then(|mappings| mappings.get("_meta"));

        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[index_name]))
            .body(merge_meta(current_meta, section, value))
            .send()
            .await
            .map_err(|e| RemoteIndexError::connection(e.to_string()))?;
        Self::check(response, false).await?;

        debug!(index = %index_name, section = %section, "Index metadata updated");
        Ok(())
    }
}

fn require_object_id(record: &Record) -> Result<&str, RemoteIndexError> {
    record
        .object_id()
        .ok_or_else(|| RemoteIndexError::validation("record has no objectID"))
}

#[async_trait]
impl RemoteIndexClient for OpenSearchClient {
    #[instrument(skip(self, record), fields(index = %index_name))]
    async fn upsert(&self, index_name: &str, record: &Record) -> Result<(), RemoteIndexError> {
        let object_id = require_object_id(record)?;

        let response = self
            .client
            .index(IndexParts::IndexId(index_name, object_id))
            .body(record.to_value())
            .send()
            .await
            .map_err(|e| RemoteIndexError::connection(e.to_string()))?;
        Self::check(response, false).await?;

        debug!(object_id = %object_id, "Record upserted");
        Ok(())
    }

    #[instrument(skip(self, records), fields(index = %index_name, count = records.len()))]
    async fn upsert_many(
        &self,
        index_name: &str,
        records: &[Record],
    ) -> Result<(), RemoteIndexError> {
        for chunk in records.chunks(self.config.max_batch_size) {
            let mut operations: Vec<BulkOperation<Value>> = Vec::with_capacity(chunk.len());
            for record in chunk {
                let object_id = require_object_id(record)?;
                operations.push(BulkOperation::index(record.to_value()).id(object_id).into());
            }
            self.send_bulk(index_name, operations).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(index = %index_name))]
    async fn delete(&self, index_name: &str, object_id: &str) -> Result<(), RemoteIndexError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index_name, object_id))
            .send()
            .await
            .map_err(|e| RemoteIndexError::connection(e.to_string()))?;

        // 404 is acceptable - the record or the whole index may not exist
        Self::check(response, true).await?;

        debug!(object_id = %object_id, "Record deleted");
        Ok(())
    }

    #[instrument(skip(self, object_ids), fields(index = %index_name, count = object_ids.len()))]
    async fn delete_many(
        &self,
        index_name: &str,
        object_ids: &[String],
    ) -> Result<(), RemoteIndexError> {
        for chunk in object_ids.chunks(self.config.max_batch_size) {
            let operations: Vec<BulkOperation<Value>> = chunk
                .iter()
                .map(|object_id| BulkOperation::delete(object_id.as_str()).into())
                .collect();
            self.send_bulk(index_name, operations).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, settings), fields(index = %index_name))]
    async fn set_settings(
        &self,
        index_name: &str,
        settings: &IndexSettings,
    ) -> Result<(), RemoteIndexError> {
        let value = serde_json::to_value(settings)?;
        self.put_meta_section(index_name, "settings", value).await
    }

    #[instrument(skip(self, synonyms), fields(index = %index_name, count = synonyms.len()))]
    async fn set_synonyms(
        &self,
        index_name: &str,
        synonyms: &[Synonym],
    ) -> Result<(), RemoteIndexError> {
        let value = serde_json::to_value(synonyms)?;
        self.put_meta_section(index_name, "synonyms", value).await
    }

    async fn exists(&self, index_name: &str) -> Result<bool, RemoteIndexError> {
        let response = self
            .client
            .count(CountParts::Index(&[index_name]))
            .body(json!({ "query": { "match_all": {} } }))
            .send()
            .await
            .map_err(|e| RemoteIndexError::connection(e.to_string()))?;
        if response.status_code().as_u16() == 404 {
            return Ok(false);
        }

        let body: Value = Self::check(response, false)
            .await?
            .json()
            .await
            .map_err(|e| RemoteIndexError::serialization(e.to_string()))?;
        Ok(body["count"].as_u64().unwrap_or(0) > 0)
    }
}
