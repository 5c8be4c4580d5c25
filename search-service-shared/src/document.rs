//! Document model trait and document references.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// A model that can be stored in and retrieved from the search index.
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Product {
///     sku: String,
///     name: String,
///     color: String,
/// }
///
/// impl Document for Product {
///     fn id(&self) -> Option<String> {
///         Some(self.sku.clone())
///     }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The document's id in the index.
    ///
    /// Returning `None` lets the search engine assign an id on insert.
    /// Bulk deletes require an id.
    fn id(&self) -> Option<String> {
        None
    }

    /// Explicit field mappings used when the index is created.
    ///
    /// `None` leaves field types to the engine's dynamic mapping.
    fn mappings() -> Option<Value> {
        None
    }
}

/// Reference to a single stored document.
///
/// When `index` is `None` the service's configured index is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPath {
    /// Target index, overriding the service default.
    pub index: Option<String>,
    /// The document's id.
    pub id: String,
}

impl DocumentPath {
    /// Reference a document by id in the default index.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            index: None,
            id: id.into(),
        }
    }

    /// Reference a document in a specific index.
    pub fn in_index(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
            id: id.into(),
        }
    }

    /// Reference a document by the id it reports.
    ///
    /// Returns `None` if the document has no id.
    pub fn of<T: Document>(document: &T) -> Option<Self> {
        document.id().map(Self::new)
    }

    /// Resolve the index name, falling back to `default_index`.
    pub fn index_or<'a>(&'a self, default_index: &'a str) -> &'a str {
        self.index.as_deref().unwrap_or(default_index)
    }
}

impl From<&str> for DocumentPath {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentPath {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}
