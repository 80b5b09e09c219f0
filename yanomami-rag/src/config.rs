//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default name of the remote index holding the knowledge base.
pub const DEFAULT_INDEX_NAME: &str = "langchain-demo";

/// Dimensionality of `text-embedding-ada-002` vectors.
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Configuration parameters shared by ingestion and query.
///
/// `dimensions` is tied to the configured embedding model; swapping
/// models requires a full index rebuild, since vectors of different
/// dimensionality cannot share an index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Name of the vector index.
    pub index_name: String,
    /// Embedding dimensionality expected by the index.
    pub dimensions: usize,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of chunks embedded and upserted per batch.
    pub batch_size: usize,
    /// Number of top results to return from a similarity query.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
            chunk_size: 1000,
            batch_size: 5,
            top_k: 5,
        }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the vector index name.
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_name = name.into();
        self
    }

    /// Set the embedding dimensionality.
    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the number of chunks per embedding/upsert batch.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set the number of top results returned by a similarity query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`RetrievalConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `index_name` is empty or any of
    /// `dimensions`, `chunk_size`, `batch_size`, `top_k` is zero.
    pub fn build(self) -> Result<RetrievalConfig> {
        if self.config.index_name.is_empty() {
            return Err(RagError::Config("index_name must not be empty".to_string()));
        }
        if self.config.dimensions == 0 {
            return Err(RagError::Config("dimensions must be greater than zero".to_string()));
        }
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.batch_size == 0 {
            return Err(RagError::Config("batch_size must be greater than zero".to_string()));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
