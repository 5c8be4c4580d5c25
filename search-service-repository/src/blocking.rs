//! Blocking search service.
//!
//! Every operation of [`SearchService`] is mirrored here and blocks the
//! calling thread until the engine responds. The service owns a
//! current-thread Tokio runtime that drives the async calls.
//!
//! Do not call these methods from inside an async runtime; use
//! [`SearchService`] there instead.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::config::{IndexSettings, SearchServiceConfig};
use crate::descriptors::{
    DeleteByQueryRequest, DeleteDescriptor, SearchDescriptor, SuggestDescriptor,
    UpdateDescriptor,
};
use crate::errors::SearchError;
use crate::opensearch::OpenSearchClient;
use crate::SearchService;
use search_service_shared::{Document, DocumentPath, ResultEnvelope};

/// Synchronous access to the documents of one index.
pub struct BlockingSearchService<T> {
    inner: SearchService<T>,
    runtime: Runtime,
}

fn build_runtime() -> Result<Runtime, SearchError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SearchError::runtime(e.to_string()))
}

impl<T: Document> BlockingSearchService<T> {
    /// Wrap an async service.
    pub fn new(inner: SearchService<T>) -> Result<Self, SearchError> {
        Ok(Self {
            inner,
            runtime: build_runtime()?,
        })
    }

    /// Connect to OpenSearch at `url` and make sure the index exists.
    pub fn connect(url: &str, settings: IndexSettings) -> Result<Self, SearchError> {
        Self::connect_with_config(url, settings, SearchServiceConfig::default())
    }

    /// Like [`connect`](Self::connect) with a custom service configuration.
    pub fn connect_with_config(
        url: &str,
        settings: IndexSettings,
        config: SearchServiceConfig,
    ) -> Result<Self, SearchError> {
        let runtime = build_runtime()?;
        let client = runtime.block_on(OpenSearchClient::new(url))?;
        let inner = SearchService::with_config(Arc::new(client), settings, config);
        runtime.block_on(inner.ensure_index())?;

        Ok(Self { inner, runtime })
    }

    /// The async service behind this one.
    pub fn as_async(&self) -> &SearchService<T> {
        &self.inner
    }

    pub fn ensure_index(&self) -> Result<(), SearchError> {
        self.runtime.block_on(self.inner.ensure_index())
    }

    pub fn insert(&self, document: &T) -> Result<(), SearchError> {
        self.runtime.block_on(self.inner.insert(document))
    }

    pub fn delete<F>(&self, path: &DocumentPath, modifier: F) -> Result<(), SearchError>
    where
        F: FnOnce(DeleteDescriptor) -> DeleteDescriptor,
    {
        self.runtime.block_on(self.inner.delete(path, modifier))
    }

    pub fn update<F>(&self, path: &DocumentPath, modifier: F) -> Result<(), SearchError>
    where
        F: FnOnce(UpdateDescriptor<T>) -> UpdateDescriptor<T>,
    {
        self.runtime.block_on(self.inner.update(path, modifier))
    }

    pub fn find<F>(&self, searcher: F, group_name: &str) -> Result<ResultEnvelope<T>, SearchError>
    where
        F: FnOnce(SearchDescriptor) -> SearchDescriptor,
    {
        self.runtime.block_on(self.inner.find(searcher, group_name))
    }

    pub fn delete_by_query(&self, request: &DeleteByQueryRequest) -> Result<(), SearchError> {
        self.runtime.block_on(self.inner.delete_by_query(request))
    }

    pub fn delete_bulk(&self, documents: &[T]) -> Result<(), SearchError> {
        self.runtime.block_on(self.inner.delete_bulk(documents))
    }

    pub fn suggest<F>(&self, selector: F, suggestion_name: &str) -> Result<Vec<String>, SearchError>
    where
        F: FnOnce(SuggestDescriptor) -> SuggestDescriptor,
    {
        self.runtime.block_on(self.inner.suggest(selector, suggestion_name))
    }

    pub fn health_check(&self) -> Result<bool, SearchError> {
        self.runtime.block_on(self.inner.health_check())
    }
}
