//! Vector index trait for storing and searching embedding records.

use async_trait::async_trait;

use crate::document::{IndexRecord, SearchResult};
use crate::error::Result;

/// A similarity-search backend holding [`IndexRecord`]s.
///
/// The index must exist before any upsert or query targets it; callers
/// enforce this by ordering ([`ensure_index`](VectorIndex::ensure_index)
/// first), not by locking.
///
/// # Example
///
/// ```rust,ignore
/// use yanomami_rag::{InMemoryIndex, VectorIndex};
///
/// let index = InMemoryIndex::new();
/// index.ensure_index("docs", 1536).await?;
/// index.upsert("docs", &records).await?;
/// let results = index.query("docs", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create a named index with the given dimensionality and a cosine
    /// similarity metric, waiting until it is queryable.
    ///
    /// Idempotent: if the index already exists (including a creation
    /// race reported as "already exists" by the backend), this is a
    /// no-op success. Any other creation failure is
    /// [`RagError::IndexProvision`](crate::RagError::IndexProvision).
    async fn ensure_index(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Insert or replace records by id.
    ///
    /// Callers are responsible for batching; the adapter sends the
    /// records it is given in one request.
    async fn upsert(&self, name: &str, records: &[IndexRecord]) -> Result<()>;

    /// Return up to `top_k` records most similar to `embedding`,
    /// ordered by descending score, with their stored texts.
    ///
    /// An empty index yields an empty `Vec`, not an error.
    async fn query(
        &self,
        name: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
