//! The result envelope returned by search calls.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One aggregation bucket flattened to a label and its document count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The bucket key.
    pub label: String,
    /// Number of documents in the bucket, if the engine reported one.
    pub count: Option<u64>,
}

impl Category {
    pub fn new(label: impl Into<String>, count: Option<u64>) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Uniform result of a search call.
///
/// `data` is `None` when the engine returned no documents, so an empty
/// result is never confused with a page that was not populated.
/// `categories` is `Some` only when the caller asked for an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    /// Total matching documents; may exceed the returned page.
    pub total_count: u64,
    /// Returned documents in engine order.
    pub data: Option<Vec<T>>,
    /// Engine-reported query execution time.
    pub elapsed: Duration,
    /// Buckets of the requested aggregation, in bucket order.
    pub categories: Option<Vec<Category>>,
}

impl<T> ResultEnvelope<T> {
    /// Number of documents returned in this page.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    /// Whether the page holds no documents.
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Iterate the returned documents.
    pub fn documents(&self) -> impl Iterator<Item = &T> {
        self.data.iter().flatten()
    }
}
