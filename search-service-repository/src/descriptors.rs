//! Request descriptors.
//!
//! Callers shape requests by passing a closure that receives a descriptor and
//! returns it with options applied:
//!
//! ```ignore
//! service
//!     .find(
//!         |s| {
//!             s.query(json!({ "match": { "name": "shirt" } }))
//!                 .size(20)
//!                 .terms_aggregation("color", "color.keyword", None)
//!         },
//!         "color",
//!     )
//!     .await?;
//! ```

use std::marker::PhantomData;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::errors::SearchError;

/// Refresh policy for write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Refresh the affected shards immediately.
    True,
    /// Do not refresh.
    False,
    /// Wait until the change is visible to search.
    WaitFor,
}

/// Options shared by single-document writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub refresh: Option<Refresh>,
    pub routing: Option<String>,
    pub retry_on_conflict: Option<i64>,
}

/// Options for deleting a single document.
#[derive(Debug, Clone, Default)]
pub struct DeleteDescriptor {
    options: WriteOptions,
}

impl DeleteDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the refresh policy.
    pub fn refresh(mut self, refresh: Refresh) -> Self {
        self.options.refresh = Some(refresh);
        self
    }

    /// Route the request to a specific shard.
    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.options.routing = Some(routing.into());
        self
    }

    pub fn into_options(self) -> WriteOptions {
        self.options
    }
}

enum UpdateDoc<T> {
    Full(T),
    Partial(Value),
}

/// A partial or full update of a single document.
pub struct UpdateDescriptor<T> {
    doc: Option<UpdateDoc<T>>,
    script: Option<Value>,
    doc_as_upsert: bool,
    options: WriteOptions,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for UpdateDescriptor<T> {
    fn default() -> Self {
        Self {
            doc: None,
            script: None,
            doc_as_upsert: false,
            options: WriteOptions::default(),
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize> UpdateDescriptor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a full document into the stored one.
    pub fn doc(mut self, document: T) -> Self {
        self.doc = Some(UpdateDoc::Full(document));
        self
    }

    /// Merge only the given fields into the stored document.
    pub fn partial(mut self, fields: Value) -> Self {
        self.doc = Some(UpdateDoc::Partial(fields));
        self
    }

    /// Update through a painless script.
    pub fn script(mut self, source: impl Into<String>, params: Value) -> Self {
        self.script = Some(json!({
            "source": source.into(),
            "lang": "painless",
            "params": params
        }));
        self
    }

    /// Create the document from `doc` if it does not exist yet.
    pub fn doc_as_upsert(mut self, doc_as_upsert: bool) -> Self {
        self.doc_as_upsert = doc_as_upsert;
        self
    }

    /// Retry the update this many times on version conflicts.
    pub fn retry_on_conflict(mut self, retries: i64) -> Self {
        self.options.retry_on_conflict = Some(retries);
        self
    }

    /// Set the refresh policy.
    pub fn refresh(mut self, refresh: Refresh) -> Self {
        self.options.refresh = Some(refresh);
        self
    }

    /// Route the request to a specific shard.
    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.options.routing = Some(routing.into());
        self
    }

    /// Whether a document or a script has been set.
    pub fn has_updates(&self) -> bool {
        self.doc.is_some() || self.script.is_some()
    }

    /// Split into the request body and its write options.
    pub fn into_parts(self) -> Result<(Value, WriteOptions), SearchError> {
        let mut body = Map::new();
        match self.doc {
            Some(UpdateDoc::Full(document)) => {
                body.insert("doc".to_string(), serde_json::to_value(document)?);
            }
            Some(UpdateDoc::Partial(fields)) => {
                body.insert("doc".to_string(), fields);
            }
            None => {}
        }
        if let Some(script) = self.script {
            body.insert("script".to_string(), script);
        }
        if self.doc_as_upsert {
            body.insert("doc_as_upsert".to_string(), json!(true));
        }
        Ok((Value::Object(body), self.options))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A search request. Without a query it matches every document.
#[derive(Debug, Clone, Default)]
pub struct SearchDescriptor {
    index: Option<String>,
    query: Option<Value>,
    from: Option<u64>,
    size: Option<u64>,
    sort: Vec<Value>,
    aggregations: Map<String, Value>,
    source: Option<Value>,
    track_total_hits: Option<bool>,
}

impl SearchDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search another index than the service default.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the query DSL clause, e.g. `json!({ "match": { "name": "shirt" } })`.
    pub fn query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Exact match on a keyword field.
    pub fn term(self, field: &str, value: impl Into<Value>) -> Self {
        let value: Value = value.into();
        self.query(json!({ "term": { field: value } }))
    }

    /// Full-text match on a field.
    pub fn match_text(self, field: &str, text: &str) -> Self {
        self.query(json!({ "match": { field: text } }))
    }

    /// Offset of the first returned hit.
    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// Maximum number of hits returned.
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Append a sort on `field`.
    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort.push(json!({ field: { "order": order.as_str() } }));
        self
    }

    /// Group hits by the values of `field` under the aggregation `name`.
    pub fn terms_aggregation(mut self, name: &str, field: &str, size: Option<u64>) -> Self {
        let mut terms = Map::new();
        terms.insert("field".to_string(), json!(field));
        if let Some(size) = size {
            terms.insert("size".to_string(), json!(size));
        }
        self.aggregations
            .insert(name.to_string(), json!({ "terms": terms }));
        self
    }

    /// Add an aggregation given as raw DSL.
    pub fn aggregation(mut self, name: &str, aggregation: Value) -> Self {
        self.aggregations.insert(name.to_string(), aggregation);
        self
    }

    /// Restrict the returned `_source` to these fields.
    pub fn source_includes(mut self, fields: &[&str]) -> Self {
        self.source = Some(json!({ "includes": fields }));
        self
    }

    /// Count all hits exactly instead of stopping at the engine default.
    pub fn track_total_hits(mut self, track: bool) -> Self {
        self.track_total_hits = Some(track);
        self
    }

    pub fn index_override(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Build the `_search` request body.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            "query".to_string(),
            self.query
                .clone()
                .unwrap_or_else(|| json!({ "match_all": {} })),
        );
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if !self.sort.is_empty() {
            body.insert("sort".to_string(), Value::Array(self.sort.clone()));
        }
        if !self.aggregations.is_empty() {
            body.insert(
                "aggs".to_string(),
                Value::Object(self.aggregations.clone()),
            );
        }
        if let Some(ref source) = self.source {
            body.insert("_source".to_string(), source.clone());
        }
        if let Some(track) = self.track_total_hits {
            body.insert("track_total_hits".to_string(), json!(track));
        }
        Value::Object(body)
    }
}

/// A suggest request made of one or more named suggesters.
#[derive(Debug, Clone, Default)]
pub struct SuggestDescriptor {
    index: Option<String>,
    suggesters: Map<String, Value>,
}

impl SuggestDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query another index than the service default.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Spelling corrections per term of `text`, drawn from `field`.
    pub fn term(mut self, name: &str, text: &str, field: &str) -> Self {
        self.suggesters.insert(
            name.to_string(),
            json!({ "text": text, "term": { "field": field } }),
        );
        self
    }

    /// Whole-phrase corrections of `text`, drawn from `field`.
    pub fn phrase(mut self, name: &str, text: &str, field: &str) -> Self {
        self.suggesters.insert(
            name.to_string(),
            json!({ "text": text, "phrase": { "field": field } }),
        );
        self
    }

    /// Completions of `prefix` from a `completion` field.
    pub fn completion(mut self, name: &str, prefix: &str, field: &str, size: Option<u64>) -> Self {
        let mut completion = Map::new();
        completion.insert("field".to_string(), json!(field));
        if let Some(size) = size {
            completion.insert("size".to_string(), json!(size));
        }
        self.suggesters.insert(
            name.to_string(),
            json!({ "prefix": prefix, "completion": completion }),
        );
        self
    }

    /// Add a suggester given as raw DSL.
    pub fn suggester(mut self, name: &str, suggester: Value) -> Self {
        self.suggesters.insert(name.to_string(), suggester);
        self
    }

    pub fn index_override(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Build the `_search` request body. Hits are not fetched.
    pub fn to_body(&self) -> Value {
        json!({
            "size": 0,
            "suggest": Value::Object(self.suggesters.clone())
        })
    }
}

/// Delete every document matching a query.
#[derive(Debug, Clone)]
pub struct DeleteByQueryRequest {
    pub index: Option<String>,
    pub query: Value,
    pub refresh: bool,
    pub conflicts_proceed: bool,
}

impl DeleteByQueryRequest {
    pub fn new(query: Value) -> Self {
        Self {
            index: None,
            query,
            refresh: false,
            conflicts_proceed: false,
        }
    }

    /// Delete from another index than the service default.
    pub fn in_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Refresh the affected shards once the deletion finished.
    pub fn refresh(mut self) -> Self {
        self.refresh = true;
        self
    }

    /// Count version conflicts instead of aborting on the first one.
    pub fn proceed_on_conflicts(mut self) -> Self {
        self.conflicts_proceed = true;
        self
    }

    pub fn to_body(&self) -> Value {
        json!({ "query": self.query })
    }
}
