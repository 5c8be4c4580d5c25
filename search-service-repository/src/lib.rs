//! # Search Service Repository
//!
//! This crate provides a typed search service for arbitrary document models.
//! It includes definitions for errors, the engine interface, a concrete
//! implementation for OpenSearch, and the projection of raw search responses
//! into result envelopes.

pub mod blocking;
pub mod client;
pub mod config;
pub mod descriptors;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod projector;
pub mod response;

#[cfg(test)]
mod testing;

pub use blocking::BlockingSearchService;
pub use client::SearchService;
pub use config::{IndexSettings, SearchServiceConfig};
pub use descriptors::{
    DeleteByQueryRequest, DeleteDescriptor, Refresh, SearchDescriptor, SortOrder,
    SuggestDescriptor, UpdateDescriptor, WriteOptions,
};
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use crate::opensearch::OpenSearchClient;
pub use projector::ResultProjector;
pub use response::{AggregationBucket, SearchResponse, SuggestEntry, SuggestOption};
pub use search_service_shared::{Category, Document, DocumentPath, ResultEnvelope};
