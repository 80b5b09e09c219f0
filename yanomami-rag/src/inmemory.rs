//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryIndex`] is a zero-dependency stand-in for the remote index,
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is
//! suitable for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexRecord, SearchResult};
use crate::error::Result;
use crate::vectorstore::VectorIndex;

/// An in-memory [`VectorIndex`] using cosine similarity for search.
///
/// Indexes are stored as nested `HashMap`s: index name → record id →
/// record. All operations are async-safe via `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    indexes: RwLock<HashMap<String, HashMap<String, IndexRecord>>>,
}

impl InMemoryIndex {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of records stored in the named index.
    pub async fn len(&self, name: &str) -> usize {
        let indexes = self.indexes.read().await;
        indexes.get(name).map_or(0, HashMap::len)
    }

    /// Return `true` if the named index holds no records.
    pub async fn is_empty(&self, name: &str) -> bool {
        self.len(name).await == 0
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn ensure_index(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        indexes.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn upsert(&self, name: &str, records: &[IndexRecord]) -> Result<()> {
        let mut indexes = self.indexes.write().await;
        let store = indexes.entry(name.to_string()).or_default();
        for record in records {
            store.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        name: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let indexes = self.indexes.read().await;
        // Unknown or empty index degrades to no results.
        let Some(store) = indexes.get(name) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<SearchResult> = store
            .values()
            .map(|record| SearchResult {
                id: record.id.clone(),
                text: record.text.clone(),
                score: cosine_similarity(&record.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![0.5, -0.25, 1.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn ensure_index_is_idempotent() {
        let index = InMemoryIndex::new();
        index.ensure_index("kb", 4).await.unwrap();
        index
            .upsert(
                "kb",
                &[IndexRecord {
                    id: "doc-0-0".into(),
                    embedding: vec![1.0, 0.0, 0.0, 0.0],
                    text: "hello".into(),
                }],
            )
            .await
            .unwrap();

        // A second ensure_index must not clear existing records.
        index.ensure_index("kb", 4).await.unwrap();
        assert_eq!(index.len("kb").await, 1);
    }

    #[tokio::test]
    async fn query_on_missing_index_returns_empty() {
        let index = InMemoryIndex::new();
        let results = index.query("nope", &[1.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let index = InMemoryIndex::new();
        index.ensure_index("kb", 2).await.unwrap();
        let record = |text: &str| IndexRecord {
            id: "doc-0-0".into(),
            embedding: vec![1.0, 0.0],
            text: text.into(),
        };
        index.upsert("kb", &[record("old")]).await.unwrap();
        index.upsert("kb", &[record("new")]).await.unwrap();

        assert_eq!(index.len("kb").await, 1);
        let results = index.query("kb", &[1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].text, "new");
    }
}
