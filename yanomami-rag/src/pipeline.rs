//! Ingestion pipeline: chunk → embed → upsert.
//!
//! [`IngestionPipeline`] populates the vector index from the corpus
//! documents. It runs once, offline; any unrecoverable error aborts the
//! run rather than leaving a partially populated index reported as
//! success.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use yanomami_rag::{IngestionPipeline, ParagraphChunker, RetrievalConfig};
//!
//! let config = RetrievalConfig::default();
//! let pipeline = IngestionPipeline::builder()
//!     .config(config.clone())
//!     .embedder(Arc::new(embedder))
//!     .index(Arc::new(index))
//!     .chunker(Arc::new(ParagraphChunker::new(config.chunk_size)))
//!     .build()?;
//!
//! let stored = pipeline.ingest(&documents).await?;
//! ```

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::RetrievalConfig;
use crate::document::{Document, IndexRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// Orchestrates corpus ingestion into the vector index.
///
/// Documents are combined into one corpus, chunked, embedded in
/// bounded-size batches, and upserted batch by batch. Record ids are
/// `doc-{batch}-{offset}`, unique across the whole run.
pub struct IngestionPipeline {
    config: RetrievalConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: Arc<dyn Chunker>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Ingest the given documents, replacing any records that share ids
    /// with a previous run.
    ///
    /// Returns the number of records stored.
    ///
    /// # Errors
    ///
    /// Fails fast on any embedding, provisioning, or upsert error; an
    /// un-embeddable chunk is never silently skipped.
    pub async fn ingest(&self, documents: &[Document]) -> Result<usize> {
        let corpus: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let corpus = corpus.join("\n\n");

        let chunks = self.chunker.chunk(&corpus);
        info!(chunk_count = chunks.len(), "corpus chunked");

        self.index.ensure_index(&self.config.index_name, self.config.dimensions).await?;

        if chunks.is_empty() {
            info!(stored = 0, "nothing to ingest");
            return Ok(0);
        }

        let mut stored = 0;
        let batch_count = chunks.len().div_ceil(self.config.batch_size);

        for (batch_index, batch) in chunks.chunks(self.config.batch_size).enumerate() {
            info!(
                batch = batch_index + 1,
                of = batch_count,
                size = batch.len(),
                "embedding batch"
            );

            // Fan out the batch's embedding calls, join before upserting.
            let embeddings =
                try_join_all(batch.iter().map(|text| self.embedder.embed(text))).await.map_err(
                    |e| {
                        error!(batch = batch_index, error = %e, "embedding failed during ingestion");
                        e
                    },
                )?;

            let records: Vec<IndexRecord> = batch
                .iter()
                .zip(embeddings)
                .enumerate()
                .map(|(offset, (text, embedding))| {
                    self.check_dimensions(&embedding)?;
                    Ok(IndexRecord {
                        id: format!("doc-{batch_index}-{offset}"),
                        embedding,
                        text: text.clone(),
                    })
                })
                .collect::<Result<_>>()?;

            self.index.upsert(&self.config.index_name, &records).await.map_err(|e| {
                error!(batch = batch_index, error = %e, "upsert failed during ingestion");
                e
            })?;

            stored += records.len();
        }

        info!(stored, "ingestion complete");
        Ok(stored)
    }

    /// Verify an embedding matches the index dimensionality. Mismatched
    /// dimensions would poison the index, so they abort the run.
    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.config.dimensions {
            return Err(RagError::Pipeline(format!(
                "embedding dimension {} does not match index dimension {}",
                embedding.len(),
                self.config.dimensions
            )));
        }
        Ok(())
    }
}

/// Builder for constructing an [`IngestionPipeline`].
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RetrievalConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl IngestionPipelineBuilder {
    /// Set the retrieval configuration.
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the corpus chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`IngestionPipeline`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any field is missing.
    pub fn build(self) -> Result<IngestionPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;

        Ok(IngestionPipeline { config, embedder, index, chunker })
    }
}
