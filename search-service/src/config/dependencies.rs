//! Dependency initialization and wiring for the search service.

use std::sync::Arc;
use tracing::info;

use crate::config::ServiceConfig;
use crate::ServiceError;
use search_service_repository::{OpenSearchClient, SearchEngineClient, SearchService};
use search_service_shared::Document;

/// Container for all initialized dependencies.
pub struct Dependencies<T> {
    /// The shared engine client, for wiring services of other document types.
    pub client: Arc<dyn SearchEngineClient>,
    /// The service for `T`, with its index in place.
    pub service: SearchService<T>,
}

impl<T: Document> Dependencies<T> {
    /// Initialize all dependencies from the environment.
    ///
    /// See [`ServiceConfig::from_env`] for the variables read.
    pub async fn from_env() -> Result<Self, ServiceError> {
        let config = ServiceConfig::from_env()?;
        Self::new(&config).await
    }

    /// Connect to OpenSearch and prepare the service.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ServiceError)` - If initialization fails
    pub async fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        info!(
            opensearch_url = %config.opensearch_url,
            index = %config.index.index_name,
            "Initializing dependencies"
        );

        let client = OpenSearchClient::new(&config.opensearch_url)
            .await
            .map_err(|e| ServiceError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        Self::with_client(Arc::new(client), config).await
    }

    /// Prepare the service on an existing client.
    ///
    /// Verifies the engine is healthy and creates the index if it is missing.
    pub async fn with_client(
        client: Arc<dyn SearchEngineClient>,
        config: &ServiceConfig,
    ) -> Result<Self, ServiceError> {
        let healthy = client
            .health_check()
            .await
            .map_err(|e| ServiceError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(ServiceError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        let service = SearchService::with_config(
            Arc::clone(&client),
            config.index.clone(),
            config.service.clone(),
        );
        service.ensure_index().await?;

        info!(index = %service.index_name(), "Search service ready");

        Ok(Self { client, service })
    }
}
