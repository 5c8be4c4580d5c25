//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::{Conflicts, Refresh as OsRefresh},
    BulkParts, DeleteByQueryParts, DeleteParts, IndexParts, OpenSearch, SearchParts, UpdateParts,
};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::config::IndexSettings;
use crate::descriptors::{DeleteByQueryRequest, Refresh, WriteOptions};
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::index_config::build_index_body;

/// OpenSearch client implementation.
///
/// One instance holds one connection pool and is meant to be shared, behind
/// an `Arc`, by every service that talks to the same cluster.
///
/// # Example
///
/// ```ignore
/// let client = Arc::new(OpenSearchClient::new("http://localhost:9200").await?);
/// let products: SearchService<Product> =
///     SearchService::new(client.clone(), IndexSettings::new("products"));
/// let orders: SearchService<Order> =
///     SearchService::new(client, IndexSettings::new("orders"));
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch client");

        Ok(Self { client })
    }

    fn refresh_param(refresh: Refresh) -> OsRefresh {
        match refresh {
            Refresh::True => OsRefresh::True,
            Refresh::False => OsRefresh::False,
            Refresh::WaitFor => OsRefresh::WaitFor,
        }
    }

    /// Pass successful responses through; turn anything else into `to_error`
    /// carrying the status and response body.
    async fn ensure_success(
        response: Response,
        operation: &str,
        to_error: fn(String) -> SearchError,
    ) -> Result<Response, SearchError> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, operation = %operation, "Request failed");
        Err(to_error(format!(
            "{} failed with status {}: {}",
            operation, status, error_body
        )))
    }

    /// Count the failed items of a bulk response.
    fn count_bulk_failures(body: &Value) -> usize {
        if !body.get("errors").and_then(Value::as_bool).unwrap_or(false) {
            return 0;
        }

        body.get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| {
                        item.as_object()
                            .map(|actions| actions.values().any(|action| action.get("error").is_some()))
                            .unwrap_or(false)
                    })
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of documents removed by a delete-by-query response.
    fn deleted_count(body: &Value) -> u64 {
        body.get("deleted").and_then(Value::as_u64).unwrap_or(0)
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        match status.as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => {
                error!(status = %status, index = %index, "Index exists check failed");
                Err(SearchError::query(format!(
                    "Index exists check failed with status {}",
                    status
                )))
            }
        }
    }

    async fn create_index(
        &self,
        settings: &IndexSettings,
        mappings: Option<Value>,
    ) -> Result<(), SearchError> {
        let body = build_index_body(settings, mappings);

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&settings.index_name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        Self::ensure_success(response, "Create index", SearchError::IndexCreationError).await?;

        info!(
            index = %settings.index_name,
            shards = settings.number_of_shards,
            replicas = settings.number_of_replicas,
            "Created index"
        );
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        document: &Value,
    ) -> Result<(), SearchError> {
        let parts = match id {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };

        let response = self
            .client
            .index(parts)
            .body(document.clone())
            .send()
            .await
            .map_err(|e| SearchError::index(e.to_string()))?;

        Self::ensure_success(response, "Index", SearchError::IndexError).await?;

        debug!(index = %index, id = ?id, "Document indexed");
        Ok(())
    }

    async fn update_document(
        &self,
        index: &str,
        id: &str,
        body: &Value,
        options: &WriteOptions,
    ) -> Result<(), SearchError> {
        let mut request = self
            .client
            .update(UpdateParts::IndexId(index, id))
            .body(body.clone());
        if let Some(refresh) = options.refresh {
            request = request.refresh(Self::refresh_param(refresh));
        }
        if let Some(ref routing) = options.routing {
            request = request.routing(routing);
        }
        if let Some(retries) = options.retry_on_conflict {
            request = request.retry_on_conflict(retries);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::update(e.to_string()))?;

        Self::ensure_success(response, "Update", SearchError::UpdateError).await?;

        debug!(index = %index, id = %id, "Document updated");
        Ok(())
    }

    async fn delete_document(
        &self,
        index: &str,
        id: &str,
        options: &WriteOptions,
    ) -> Result<(), SearchError> {
        let mut request = self.client.delete(DeleteParts::IndexId(index, id));
        if let Some(refresh) = options.refresh {
            request = request.refresh(Self::refresh_param(refresh));
        }
        if let Some(ref routing) = options.routing {
            request = request.routing(routing);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::delete(e.to_string()))?;

        // 404 is acceptable - document may not exist
        if response.status_code().as_u16() == 404 {
            debug!(index = %index, id = %id, "Document to delete not found");
            return Ok(());
        }
        Self::ensure_success(response, "Delete", SearchError::DeleteError).await?;

        debug!(index = %index, id = %id, "Document deleted");
        Ok(())
    }

    async fn delete_by_query(
        &self,
        index: &str,
        request: &DeleteByQueryRequest,
    ) -> Result<(), SearchError> {
        let indices = [index];
        let mut call = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&indices))
            .body(request.to_body())
            .refresh(request.refresh);
        if request.conflicts_proceed {
            call = call.conflicts(Conflicts::Proceed);
        }

        let response = call
            .send()
            .await
            .map_err(|e| SearchError::delete(e.to_string()))?;

        let response =
            Self::ensure_success(response, "Delete by query", SearchError::DeleteError).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let deleted = Self::deleted_count(&body);
        debug!(index = %index, deleted = deleted, "Delete by query finished");
        Ok(())
    }

    async fn bulk(&self, index: &str, operations: Vec<Value>) -> Result<(), SearchError> {
        let lines = operations.len();
        let body: Vec<JsonBody<Value>> = operations.into_iter().map(JsonBody::from).collect();

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::bulk_index(e.to_string()))?;

        let response = Self::ensure_success(response, "Bulk", SearchError::BulkIndexError).await?;
        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let failed = Self::count_bulk_failures(&response_body);
        if failed > 0 {
            error!(index = %index, failed = failed, "Bulk request had failures");
            return Err(SearchError::bulk_index(format!("{} bulk items failed", failed)));
        }

        debug!(index = %index, lines = lines, "Bulk request completed");
        Ok(())
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| SearchError::query(e.to_string()))?;

        let response = Self::ensure_success(response, "Search", SearchError::QueryError).await?;

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let health: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        let status = health
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        info!(status = %status, "OpenSearch cluster status");

        Ok(status == "green" || status == "yellow")
    }
}
