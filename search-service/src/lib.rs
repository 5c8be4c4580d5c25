//! # Search Service
//!
//! Entry point for applications using the generic search service.
//!
//! This crate reads the service configuration from the environment, sets up
//! logging, and wires an OpenSearch client into a typed `SearchService`.

pub mod config;
pub mod telemetry;

pub use config::{Dependencies, ServiceConfig};
pub use search_service_repository::{BlockingSearchService, SearchError, SearchService};
pub use telemetry::{init_tracing, LogFormat};

use thiserror::Error;

/// Errors that can occur during service initialization.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),
}

impl ServiceError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
