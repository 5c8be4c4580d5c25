//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, mock, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::config::IndexSettings;
use crate::descriptors::{DeleteByQueryRequest, WriteOptions};
use crate::errors::SearchError;

/// Abstract interface for search engine operations.
///
/// The trait works on JSON request and response bodies so a single client
/// handle serves every document type. The typed layer on top is
/// [`SearchService`](crate::SearchService).
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so one handle can be shared
/// across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>`. Engine failures are passed
/// through; implementations do not retry.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Check whether `index` exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// Create an index with the given settings and optional field mappings.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchError::IndexCreationError)` - If the engine rejected it
    async fn create_index(
        &self,
        settings: &IndexSettings,
        mappings: Option<Value>,
    ) -> Result<(), SearchError>;

    /// Index a single document.
    ///
    /// With an `id` the document replaces any document stored under it.
    /// Without one the engine assigns an id.
    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        document: &Value,
    ) -> Result<(), SearchError>;

    /// Apply an update body (`doc`, `script`, `doc_as_upsert`) to a document.
    async fn update_document(
        &self,
        index: &str,
        id: &str,
        body: &Value,
        options: &WriteOptions,
    ) -> Result<(), SearchError>;

    /// Delete a document.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was deleted (or didn't exist)
    /// * `Err(SearchError)` - If the deletion fails
    async fn delete_document(
        &self,
        index: &str,
        id: &str,
        options: &WriteOptions,
    ) -> Result<(), SearchError>;

    /// Delete every document of `index` matching the request's query.
    async fn delete_by_query(
        &self,
        index: &str,
        request: &DeleteByQueryRequest,
    ) -> Result<(), SearchError>;

    /// Send a bulk request made of action and source lines.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every action succeeded
    /// * `Err(SearchError::BulkIndexError)` - If any action failed
    async fn bulk(&self, index: &str, operations: Vec<Value>) -> Result<(), SearchError>;

    /// Run a `_search` request and return the raw response body.
    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the cluster status is green or yellow
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
