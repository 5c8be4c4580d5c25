//! Search service implementation.
//!
//! This module provides the typed facade application code uses to index,
//! update, delete, search and get suggestions for documents of one model.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::config::{IndexSettings, SearchServiceConfig};
use crate::descriptors::{
    DeleteByQueryRequest, DeleteDescriptor, SearchDescriptor, SuggestDescriptor,
    UpdateDescriptor,
};
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::projector::ResultProjector;
use crate::response::SearchResponse;
use search_service_shared::{Document, DocumentPath, ResultEnvelope};

/// Typed access to the documents of one index.
///
/// The engine client is shared; cloning the service is cheap.
pub struct SearchService<T> {
    client: Arc<dyn SearchEngineClient>,
    settings: IndexSettings,
    config: SearchServiceConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for SearchService<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            settings: self.settings.clone(),
            config: self.config.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> SearchService<T> {
    /// Create a new SearchService with default configuration.
    pub fn new(client: Arc<dyn SearchEngineClient>, settings: IndexSettings) -> Self {
        Self::with_config(client, settings, SearchServiceConfig::default())
    }

    /// Create a new SearchService with custom configuration.
    pub fn with_config(
        client: Arc<dyn SearchEngineClient>,
        settings: IndexSettings,
        config: SearchServiceConfig,
    ) -> Self {
        Self {
            client,
            settings,
            config,
            _marker: PhantomData,
        }
    }

    /// The default index of this service.
    pub fn index_name(&self) -> &str {
        &self.settings.index_name
    }

    /// Create the index if it does not exist yet.
    ///
    /// The index gets the configured shard and replica counts and the
    /// mappings of `T`.
    #[instrument(skip(self), fields(index = %self.settings.index_name))]
    pub async fn ensure_index(&self) -> Result<(), SearchError> {
        if self.client.index_exists(&self.settings.index_name).await? {
            debug!("Index already exists");
            return Ok(());
        }

        self.client.create_index(&self.settings, T::mappings()).await?;
        info!("Index created");
        Ok(())
    }

    /// Index a document.
    ///
    /// Documents without an id get one assigned by the engine.
    #[instrument(skip(self, document), fields(index = %self.settings.index_name))]
    pub async fn insert(&self, document: &T) -> Result<(), SearchError> {
        let body = serde_json::to_value(document)?;
        let id = document.id();

        self.client
            .index_document(&self.settings.index_name, id.as_deref(), &body)
            .await
    }

    /// Delete the document at `path`.
    ///
    /// `modifier` sets request options such as the refresh policy; pass
    /// `|d| d` for none. Deleting a missing document succeeds.
    #[instrument(skip(self, modifier), fields(id = %path.id))]
    pub async fn delete<F>(&self, path: &DocumentPath, modifier: F) -> Result<(), SearchError>
    where
        F: FnOnce(DeleteDescriptor) -> DeleteDescriptor,
    {
        let options = modifier(DeleteDescriptor::new()).into_options();

        self.client
            .delete_document(path.index_or(&self.settings.index_name), &path.id, &options)
            .await
    }

    /// Update the document at `path`.
    ///
    /// `modifier` supplies the partial document or script. An update that
    /// sets neither is not sent.
    #[instrument(skip(self, modifier), fields(id = %path.id))]
    pub async fn update<F>(&self, path: &DocumentPath, modifier: F) -> Result<(), SearchError>
    where
        F: FnOnce(UpdateDescriptor<T>) -> UpdateDescriptor<T>,
    {
        let descriptor = modifier(UpdateDescriptor::new());
        if !descriptor.has_updates() {
            debug!("No fields to update");
            return Ok(());
        }

        let (body, options) = descriptor.into_parts()?;

        self.client
            .update_document(
                path.index_or(&self.settings.index_name),
                &path.id,
                &body,
                &options,
            )
            .await
    }

    /// Search and shape the response into a [`ResultEnvelope`].
    ///
    /// `searcher` builds the request; `|s| s` matches every document. When
    /// `group_name` is not blank, the buckets of the aggregation of that
    /// name become the envelope's `categories`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let result = service
    ///     .find(
    ///         |s| s.match_text("name", "shirt").terms_aggregation("color", "color", None),
    ///         "color",
    ///     )
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// * `SearchError::AggregationNotFound` - If `group_name` names no
    ///   aggregation of the response
    #[instrument(skip(self, searcher), fields(index = %self.settings.index_name))]
    pub async fn find<F>(&self, searcher: F, group_name: &str) -> Result<ResultEnvelope<T>, SearchError>
    where
        F: FnOnce(SearchDescriptor) -> SearchDescriptor,
    {
        let descriptor = searcher(SearchDescriptor::new());
        let index = descriptor
            .index_override()
            .unwrap_or(&self.settings.index_name);

        let raw = self.client.search(index, &descriptor.to_body()).await?;
        let response = SearchResponse::<T>::from_value(raw)?;

        let envelope = ResultProjector::project(response, group_name)?;
        debug!(
            total = envelope.total_count,
            returned = envelope.len(),
            took_ms = envelope.elapsed.as_millis() as u64,
            "Search completed"
        );
        Ok(envelope)
    }

    /// Delete every document matching a query.
    #[instrument(skip(self, request), fields(index = %self.settings.index_name))]
    pub async fn delete_by_query(&self, request: &DeleteByQueryRequest) -> Result<(), SearchError> {
        let index = request
            .index
            .as_deref()
            .unwrap_or(&self.settings.index_name);

        self.client.delete_by_query(index, request).await
    }

    /// Delete a batch of documents by their ids.
    ///
    /// Requests are split at the configured maximum batch size.
    ///
    /// # Errors
    ///
    /// * `SearchError::MissingDocumentId` - If any document has no id; nothing
    ///   is sent in that case
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn delete_bulk(&self, documents: &[T]) -> Result<(), SearchError> {
        if documents.is_empty() {
            return Ok(());
        }

        let ids = documents
            .iter()
            .enumerate()
            .map(|(position, document)| {
                document.id().ok_or_else(|| {
                    SearchError::MissingDocumentId(format!("document at position {}", position))
                })
            })
            .collect::<Result<Vec<String>, SearchError>>()?;

        for chunk in ids.chunks(self.config.chunk_size(ids.len())) {
            let operations: Vec<Value> = chunk
                .iter()
                .map(|id| json!({ "delete": { "_index": self.settings.index_name, "_id": id } }))
                .collect();

            self.client
                .bulk(&self.settings.index_name, operations)
                .await?;
        }

        debug!(count = ids.len(), "Bulk delete completed");
        Ok(())
    }

    /// Get the suggestions of the suggester `suggestion_name`.
    ///
    /// `selector` declares the suggesters to run. Returns the option texts
    /// in response order, or an empty list when the engine returned no
    /// suggestions.
    #[instrument(skip(self, selector), fields(index = %self.settings.index_name))]
    pub async fn suggest<F>(&self, selector: F, suggestion_name: &str) -> Result<Vec<String>, SearchError>
    where
        F: FnOnce(SuggestDescriptor) -> SuggestDescriptor,
    {
        let descriptor = selector(SuggestDescriptor::new());
        let index = descriptor
            .index_override()
            .unwrap_or(&self.settings.index_name);

        let raw = self.client.search(index, &descriptor.to_body()).await?;
        let response = SearchResponse::<T>::from_value(raw)?;

        ResultProjector::suggestions(&response, suggestion_name)
    }

    /// Check that the engine is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool, SearchError> {
        self.client.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::Refresh;
    use crate::testing::{Call, MockEngine};
    use serde::{Deserialize, Serialize};
    use search_service_shared::Category;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        sku: Option<String>,
        name: String,
        color: String,
    }

    impl Document for Product {
        fn id(&self) -> Option<String> {
            self.sku.clone()
        }

        fn mappings() -> Option<Value> {
            Some(json!({ "properties": { "color": { "type": "keyword" } } }))
        }
    }

    fn product(sku: Option<&str>, name: &str, color: &str) -> Product {
        Product {
            sku: sku.map(str::to_string),
            name: name.to_string(),
            color: color.to_string(),
        }
    }

    fn service(engine: Arc<MockEngine>) -> SearchService<Product> {
        SearchService::new(engine, IndexSettings::new("products"))
    }

    #[tokio::test]
    async fn test_ensure_index_creates_missing_index() {
        let engine = Arc::new(MockEngine::new().without_index());
        let service = SearchService::<Product>::new(
            engine.clone(),
            IndexSettings::new("products").with_replicas(1).with_shards(2),
        );

        service.ensure_index().await.unwrap();

        assert_eq!(
            engine.calls(),
            vec![
                Call::IndexExists("products".to_string()),
                Call::CreateIndex {
                    index: "products".to_string(),
                    replicas: 1,
                    shards: 2,
                    mappings: Product::mappings(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_ensure_index_keeps_existing_index() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        service.ensure_index().await.unwrap();

        assert_eq!(engine.calls(), vec![Call::IndexExists("products".to_string())]);
    }

    #[tokio::test]
    async fn test_insert_with_and_without_id() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        service
            .insert(&product(Some("sku-1"), "Shirt", "red"))
            .await
            .unwrap();
        service.insert(&product(None, "Hat", "blue")).await.unwrap();

        let calls = engine.calls();
        assert!(matches!(
            &calls[0],
            Call::Index { index, id: Some(id), document }
                if index == "products" && id == "sku-1" && document["name"] == "Shirt"
        ));
        assert!(matches!(&calls[1], Call::Index { id: None, .. }));
    }

    #[tokio::test]
    async fn test_delete_with_options() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        service
            .delete(&DocumentPath::new("sku-1"), |d| d.refresh(Refresh::True))
            .await
            .unwrap();
        service
            .delete(&DocumentPath::in_index("archive", "sku-2"), |d| d)
            .await
            .unwrap();

        let calls = engine.calls();
        assert!(matches!(
            &calls[0],
            Call::Delete { index, id, options }
                if index == "products" && id == "sku-1" && options.refresh == Some(Refresh::True)
        ));
        assert!(matches!(
            &calls[1],
            Call::Delete { index, .. } if index == "archive"
        ));
    }

    #[tokio::test]
    async fn test_update_partial() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        service
            .update(&DocumentPath::new("sku-1"), |u| {
                u.partial(json!({ "color": "green" })).retry_on_conflict(2)
            })
            .await
            .unwrap();

        let calls = engine.calls();
        assert!(matches!(
            &calls[0],
            Call::Update { id, body, options, .. }
                if id == "sku-1" && body["doc"]["color"] == "green" && options.retry_on_conflict == Some(2)
        ));
    }

    #[tokio::test]
    async fn test_update_without_changes_is_not_sent() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        service
            .update(&DocumentPath::new("sku-1"), |u| u)
            .await
            .unwrap();

        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_find_projects_response() {
        let engine = Arc::new(MockEngine::new().with_search_response(json!({
            "took": 87,
            "hits": {
                "total": { "value": 42 },
                "hits": [
                    { "_source": { "sku": "1", "name": "d1", "color": "red" } },
                    { "_source": { "sku": "2", "name": "d2", "color": "blue" } }
                ]
            },
            "aggregations": {
                "color": {
                    "buckets": [
                        { "key": "red", "doc_count": 10 },
                        { "key": "blue", "doc_count": 5 }
                    ]
                }
            }
        })));
        let service = service(engine.clone());

        let envelope = service
            .find(|s| s.terms_aggregation("color", "color", None), "color")
            .await
            .unwrap();

        assert_eq!(envelope.total_count, 42);
        assert_eq!(envelope.elapsed, Duration::from_millis(87));
        let names: Vec<&str> = envelope.documents().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["d1", "d2"]);
        assert_eq!(
            envelope.categories,
            Some(vec![
                Category::new("red", Some(10)),
                Category::new("blue", Some(5)),
            ])
        );

        let calls = engine.calls();
        assert!(matches!(
            &calls[0],
            Call::Search { index, body }
                if index == "products" && body["aggs"]["color"]["terms"]["field"] == "color"
        ));
    }

    #[tokio::test]
    async fn test_find_with_keyless_aggregation() {
        let body = json!({
            "took": 3,
            "hits": {
                "total": { "value": 1 },
                "hits": [ { "_source": { "sku": "1", "name": "d1", "color": "red" } } ]
            },
            "aggregations": {
                "color": { "buckets": [ { "key": "red", "doc_count": 1 } ] },
                "in_stock": { "buckets": [ { "doc_count": 1 }, { "doc_count": 0 } ] }
            }
        });
        let engine = Arc::new(MockEngine::new().with_search_response(body));
        let service = service(engine);

        let ungrouped = service.find(|s| s, "").await.unwrap();
        let grouped = service.find(|s| s, "color").await.unwrap();

        assert_eq!(ungrouped.total_count, 1);
        assert!(ungrouped.categories.is_none());
        assert_eq!(grouped.categories, Some(vec![Category::new("red", Some(1))]));
    }

    #[tokio::test]
    async fn test_find_no_results() {
        let engine = Arc::new(MockEngine::new().with_search_response(json!({
            "took": 5,
            "hits": { "total": { "value": 0 }, "hits": [] }
        })));
        let service = service(engine);

        let envelope = service.find(|s| s, "").await.unwrap();

        assert_eq!(envelope.total_count, 0);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.elapsed, Duration::from_millis(5));
        assert!(envelope.categories.is_none());
    }

    #[tokio::test]
    async fn test_find_unknown_aggregation() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine);

        let result = service.find(|s| s, "color").await;

        assert!(matches!(result, Err(SearchError::AggregationNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_index_override() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        service.find(|s| s.index("archive"), "").await.unwrap();

        assert!(matches!(
            &engine.calls()[0],
            Call::Search { index, .. } if index == "archive"
        ));
    }

    #[tokio::test]
    async fn test_delete_by_query() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        let request = DeleteByQueryRequest::new(json!({ "term": { "color": "red" } })).refresh();
        service.delete_by_query(&request).await.unwrap();

        assert_eq!(
            engine.calls(),
            vec![Call::DeleteByQuery {
                index: "products".to_string(),
                body: json!({ "query": { "term": { "color": "red" } } }),
                refresh: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_delete_bulk_chunks_requests() {
        let engine = Arc::new(MockEngine::new());
        let service = SearchService::<Product>::with_config(
            engine.clone(),
            IndexSettings::new("products"),
            SearchServiceConfig::with_max_batch_size(2),
        );

        let documents = vec![
            product(Some("1"), "a", "red"),
            product(Some("2"), "b", "red"),
            product(Some("3"), "c", "red"),
        ];
        service.delete_bulk(&documents).await.unwrap();

        let calls = engine.calls();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            Call::Bulk { index, operations } => {
                assert_eq!(index, "products");
                assert_eq!(operations.len(), 2);
                assert_eq!(operations[0]["delete"]["_id"], "1");
                assert_eq!(operations[1]["delete"]["_id"], "2");
            }
            other => panic!("unexpected call: {:?}", other),
        }
        match &calls[1] {
            Call::Bulk { operations, .. } => assert_eq!(operations[0]["delete"]["_id"], "3"),
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_bulk_empty() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        service.delete_bulk(&[]).await.unwrap();

        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_bulk_requires_ids() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        let documents = vec![product(Some("1"), "a", "red"), product(None, "b", "red")];
        let result = service.delete_bulk(&documents).await;

        assert!(matches!(result, Err(SearchError::MissingDocumentId(_))));
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_suggest() {
        let engine = Arc::new(MockEngine::new().with_search_response(json!({
            "took": 2,
            "hits": { "total": { "value": 0 }, "hits": [] },
            "suggest": {
                "names": [
                    {
                        "text": "sh",
                        "offset": 0,
                        "length": 2,
                        "options": [ { "text": "shirt" }, { "text": "shorts" } ]
                    }
                ]
            }
        })));
        let service = service(engine.clone());

        let suggestions = service
            .suggest(|s| s.completion("names", "sh", "name_suggest", None), "names")
            .await
            .unwrap();

        assert_eq!(suggestions, vec!["shirt", "shorts"]);
        assert!(matches!(
            &engine.calls()[0],
            Call::Search { body, .. } if body["suggest"]["names"]["prefix"] == "sh"
        ));
    }

    #[tokio::test]
    async fn test_suggest_without_suggestions() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine);

        let suggestions = service
            .suggest(|s| s.term("spelling", "shrit", "name"), "spelling")
            .await
            .unwrap();

        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_engine_errors_propagate() {
        let engine = Arc::new(MockEngine::new().failing());
        let service = service(engine);

        let result = service.insert(&product(Some("1"), "a", "red")).await;

        assert!(matches!(result, Err(SearchError::ConnectionError(_))));
        assert!(!service.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_finds_share_client() {
        let engine = Arc::new(MockEngine::new());
        let service = service(engine.clone());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.find(|s| s, "").await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(engine.calls().len(), 4);
    }
}
