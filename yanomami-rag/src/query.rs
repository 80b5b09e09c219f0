//! Query-time retrieval service.
//!
//! [`Retriever`] answers a single question: normalize → embed → query
//! the vector index → return the passage texts in relevance order.
//! This is the request-time hot path, so it fails soft: any error
//! collapses to "no context retrieved" and the collaborator proceeds
//! without it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::question::Question;
use crate::vectorstore::VectorIndex;

/// The query-time retrieval service.
///
/// Independent per incoming question; safe to share across concurrent
/// queries since the only shared state is the read-only remote index.
/// Callers with a response-time budget wrap [`retrieve`](Retriever::retrieve)
/// in their own timeout and treat expiry like an empty result.
///
/// # Example
///
/// ```rust,ignore
/// use yanomami_rag::{Question, Retriever};
///
/// let retriever = Retriever::new(config, embedder, index);
/// let passages = retriever.retrieve(&Question::from("what means mi weya?")).await;
/// ```
pub struct Retriever {
    config: RetrievalConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    /// Create a new retriever over the given embedder and index.
    pub fn new(
        config: RetrievalConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self { config, embedder, index }
    }

    /// Retrieve the passages most relevant to `question`, best first.
    ///
    /// Returns an empty `Vec` on any failure; never panics or errors on
    /// the interactive path.
    pub async fn retrieve(&self, question: &Question) -> Vec<String> {
        self.retrieve_top_k(question, self.config.top_k).await
    }

    /// Like [`retrieve`](Retriever::retrieve) with an explicit result count.
    pub async fn retrieve_top_k(&self, question: &Question, top_k: usize) -> Vec<String> {
        let text = question.normalize();
        debug!(text_len = text.len(), "normalized question");

        let embedding = match self.embedder.embed(&text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "query embedding failed, returning no context");
                return Vec::new();
            }
        };

        if embedding.len() != self.config.dimensions {
            warn!(
                got = embedding.len(),
                expected = self.config.dimensions,
                "query embedding dimension mismatch, returning no context"
            );
            return Vec::new();
        }

        let results =
            match self.index.query(&self.config.index_name, &embedding, top_k).await {
                Ok(results) => results,
                Err(e) => {
                    warn!(error = %e, "index query failed, returning no context");
                    return Vec::new();
                }
            };

        info!(result_count = results.len(), "retrieval completed");
        results.into_iter().map(|r| r.text).collect()
    }
}
