//! Environment configuration.

use std::env;
use std::str::FromStr;

use search_service_repository::config::{DEFAULT_NUMBER_OF_REPLICAS, DEFAULT_NUMBER_OF_SHARDS};
use search_service_repository::{IndexSettings, SearchServiceConfig};

use crate::telemetry::LogFormat;
use crate::ServiceError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default maximum bulk batch size.
const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Configuration read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub opensearch_url: String,
    pub index: IndexSettings,
    pub service: SearchServiceConfig,
    pub log_format: LogFormat,
}

impl ServiceConfig {
    /// Load the configuration from the environment, reading `.env` first.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `SEARCH_INDEX_NAME`: Index to operate on (required)
    /// - `SEARCH_INDEX_REPLICAS`: Replicas for a new index (default: 5)
    /// - `SEARCH_INDEX_SHARDS`: Shards for a new index (default: 5)
    /// - `SEARCH_MAX_BATCH_SIZE`: Bulk batch size, 0 for unlimited (default: 1000)
    /// - `LOG_FORMAT`: `json` or `pretty` (default: pretty)
    pub fn from_env() -> Result<Self, ServiceError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opensearch_url =
            lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());

        let index_name = lookup("SEARCH_INDEX_NAME")
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ServiceError::config("SEARCH_INDEX_NAME is required"))?;

        let replicas = parse_or(&lookup, "SEARCH_INDEX_REPLICAS", DEFAULT_NUMBER_OF_REPLICAS)?;
        let shards = parse_or(&lookup, "SEARCH_INDEX_SHARDS", DEFAULT_NUMBER_OF_SHARDS)?;
        let max_batch_size = parse_or(&lookup, "SEARCH_MAX_BATCH_SIZE", DEFAULT_MAX_BATCH_SIZE)?;

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            opensearch_url,
            index: IndexSettings::new(index_name)
                .with_replicas(replicas)
                .with_shards(shards),
            service: if max_batch_size == 0 {
                SearchServiceConfig::unlimited()
            } else {
                SearchServiceConfig::with_max_batch_size(max_batch_size)
            },
            log_format,
        })
    }
}

fn parse_or<F, V>(lookup: &F, key: &str, default: V) -> Result<V, ServiceError>
where
    F: Fn(&str) -> Option<String>,
    V: FromStr,
    V::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| ServiceError::config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}
