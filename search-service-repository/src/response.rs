//! Parsed search engine responses.
//!
//! The `_search` response is parsed once into [`SearchResponse`], which the
//! [`ResultProjector`](crate::projector::ResultProjector) then shapes into a
//! result envelope.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::SearchError;

/// One bucket of a bucketing aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationBucket {
    pub key: String,
    pub doc_count: Option<u64>,
}

/// A single option returned by a suggester.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuggestOption {
    pub text: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub freq: Option<u64>,
}

/// Suggestions for one token (term suggester) or the whole input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuggestEntry {
    pub text: String,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub options: Vec<SuggestOption>,
}

/// A search response with typed documents.
#[derive(Debug, Clone)]
pub struct SearchResponse<T> {
    /// Total matching documents.
    pub total: u64,
    /// Engine-reported execution time in milliseconds.
    pub took_ms: u64,
    /// Returned documents in hit order.
    pub documents: Vec<T>,
    /// Raw aggregation results by name. Buckets are read on demand with
    /// [`AggregationBucket::from_aggregation`].
    pub aggregations: HashMap<String, Value>,
    /// Suggester results by name.
    pub suggestions: HashMap<String, Vec<SuggestEntry>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTotal {
    Count(u64),
    Object { value: u64 },
}

#[derive(Deserialize)]
struct RawHit<T> {
    #[serde(rename = "_source")]
    source: T,
}

#[derive(Deserialize)]
struct RawHits<T> {
    #[serde(default)]
    total: Option<RawTotal>,
    #[serde(default = "Vec::new")]
    hits: Vec<RawHit<T>>,
}

#[derive(Deserialize)]
struct RawBucket {
    #[serde(default)]
    key: Option<Value>,
    #[serde(default)]
    key_as_string: Option<String>,
    #[serde(default)]
    doc_count: Option<u64>,
}

#[derive(Deserialize)]
struct RawResponse<T> {
    #[serde(default)]
    took: u64,
    #[serde(default = "Option::default")]
    hits: Option<RawHits<T>>,
    #[serde(default)]
    aggregations: HashMap<String, Value>,
    #[serde(default)]
    suggest: HashMap<String, Vec<SuggestEntry>>,
}

impl<T: DeserializeOwned> SearchResponse<T> {
    /// Parse a `_search` response body.
    pub fn from_value(value: Value) -> Result<Self, SearchError> {
        let raw: RawResponse<T> = serde_json::from_value(value)
            .map_err(|e| SearchError::parse(format!("Invalid search response: {}", e)))?;

        let (total, documents) = match raw.hits {
            Some(hits) => {
                let total = match hits.total {
                    Some(RawTotal::Count(count)) => count,
                    Some(RawTotal::Object { value }) => value,
                    None => hits.hits.len() as u64,
                };
                (total, hits.hits.into_iter().map(|hit| hit.source).collect())
            }
            None => (0, Vec::new()),
        };

        Ok(Self {
            total,
            took_ms: raw.took,
            documents,
            aggregations: raw.aggregations,
            suggestions: raw.suggest,
        })
    }
}

impl AggregationBucket {
    /// Read the bucket list of one aggregation result.
    ///
    /// Metric aggregations carry no buckets and yield an empty list. Buckets
    /// without a key (non-keyed `filters`) are labelled by their position.
    pub fn from_aggregation(aggregation: &Value) -> Result<Vec<Self>, SearchError> {
        let Some(buckets) = aggregation.get("buckets").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        buckets
            .iter()
            .enumerate()
            .map(|(position, bucket)| {
                let raw: RawBucket = serde_json::from_value(bucket.clone()).map_err(|e| {
                    SearchError::parse(format!("Invalid aggregation bucket: {}", e))
                })?;
                let key = match (raw.key_as_string, raw.key) {
                    (Some(key), _) => key,
                    (None, Some(Value::String(key))) => key,
                    (None, Some(other)) => other.to_string(),
                    (None, None) => position.to_string(),
                };
                Ok(Self {
                    key,
                    doc_count: raw.doc_count,
                })
            })
            .collect()
    }
}
