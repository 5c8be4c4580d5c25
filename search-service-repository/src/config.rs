//! Configuration types for the SearchService.

/// Default number of replicas for a newly created index.
pub const DEFAULT_NUMBER_OF_REPLICAS: u32 = 5;

/// Default number of primary shards for a newly created index.
pub const DEFAULT_NUMBER_OF_SHARDS: u32 = 5;

/// Settings of the index a service reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// Default index for every operation.
    pub index_name: String,
    /// Replica count used when the index has to be created.
    pub number_of_replicas: u32,
    /// Shard count used when the index has to be created.
    pub number_of_shards: u32,
}

impl IndexSettings {
    /// Settings for `index_name` with the default replica and shard counts.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            number_of_replicas: DEFAULT_NUMBER_OF_REPLICAS,
            number_of_shards: DEFAULT_NUMBER_OF_SHARDS,
        }
    }

    /// Override the replica count.
    pub fn with_replicas(mut self, number_of_replicas: u32) -> Self {
        self.number_of_replicas = number_of_replicas;
        self
    }

    /// Override the shard count.
    pub fn with_shards(mut self, number_of_shards: u32) -> Self {
        self.number_of_shards = number_of_shards;
        self
    }
}

/// Configuration for the SearchService.
#[derive(Debug, Clone)]
pub struct SearchServiceConfig {
    /// Maximum number of documents sent in a single bulk request.
    /// Larger batches are split. Set to None to send everything at once.
    pub max_batch_size: Option<usize>,
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
        }
    }
}

impl SearchServiceConfig {
    /// Create a config with no batch size limit.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }

    /// Chunk size for bulk requests of `len` items.
    pub(crate) fn chunk_size(&self, len: usize) -> usize {
        match self.max_batch_size {
            Some(max) if max > 0 => max,
            _ => len.max(1),
        }
    }
}
