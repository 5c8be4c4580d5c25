//! In-memory engine used by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::IndexSettings;
use crate::descriptors::{DeleteByQueryRequest, WriteOptions};
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;

/// A call received by [`MockEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    IndexExists(String),
    CreateIndex {
        index: String,
        replicas: u32,
        shards: u32,
        mappings: Option<Value>,
    },
    Index {
        index: String,
        id: Option<String>,
        document: Value,
    },
    Update {
        index: String,
        id: String,
        body: Value,
        options: WriteOptions,
    },
    Delete {
        index: String,
        id: String,
        options: WriteOptions,
    },
    DeleteByQuery {
        index: String,
        body: Value,
        refresh: bool,
    },
    Bulk {
        index: String,
        operations: Vec<Value>,
    },
    Search {
        index: String,
        body: Value,
    },
}

/// Records every call and answers searches with a canned response.
///
/// `calls` is read from plain `#[test]` threads, so it is a std mutex.
pub struct MockEngine {
    pub calls: Mutex<Vec<Call>>,
    pub search_response: Value,
    pub index_exists: bool,
    pub should_fail: bool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            search_response: json!({
                "took": 1,
                "hits": { "total": { "value": 0 }, "hits": [] }
            }),
            index_exists: true,
            should_fail: false,
        }
    }

    pub fn with_search_response(mut self, response: Value) -> Self {
        self.search_response = response;
        self
    }

    pub fn without_index(mut self) -> Self {
        self.index_exists = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), SearchError> {
        if self.should_fail {
            return Err(SearchError::connection("Mock failure"));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl SearchEngineClient for MockEngine {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        self.record(Call::IndexExists(index.to_string()))?;
        Ok(self.index_exists)
    }

    async fn create_index(
        &self,
        settings: &IndexSettings,
        mappings: Option<Value>,
    ) -> Result<(), SearchError> {
        self.record(Call::CreateIndex {
            index: settings.index_name.clone(),
            replicas: settings.number_of_replicas,
            shards: settings.number_of_shards,
            mappings,
        })
    }

    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        document: &Value,
    ) -> Result<(), SearchError> {
        self.record(Call::Index {
            index: index.to_string(),
            id: id.map(str::to_string),
            document: document.clone(),
        })
    }

    async fn update_document(
        &self,
        index: &str,
        id: &str,
        body: &Value,
        options: &WriteOptions,
    ) -> Result<(), SearchError> {
        self.record(Call::Update {
            index: index.to_string(),
            id: id.to_string(),
            body: body.clone(),
            options: options.clone(),
        })
    }

    async fn delete_document(
        &self,
        index: &str,
        id: &str,
        options: &WriteOptions,
    ) -> Result<(), SearchError> {
        self.record(Call::Delete {
            index: index.to_string(),
            id: id.to_string(),
            options: options.clone(),
        })
    }

    async fn delete_by_query(
        &self,
        index: &str,
        request: &DeleteByQueryRequest,
    ) -> Result<(), SearchError> {
        self.record(Call::DeleteByQuery {
            index: index.to_string(),
            body: request.to_body(),
            refresh: request.refresh,
        })
    }

    async fn bulk(&self, index: &str, operations: Vec<Value>) -> Result<(), SearchError> {
        self.record(Call::Bulk {
            index: index.to_string(),
            operations,
        })
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchError> {
        self.record(Call::Search {
            index: index.to_string(),
            body: body.clone(),
        })?;
        Ok(self.search_response.clone())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(!self.should_fail)
    }
}
