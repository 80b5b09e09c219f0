//! End-to-end ingestion and retrieval tests over the in-memory index.
//!
//! A deterministic bag-of-words embedder stands in for the remote
//! embedding model so the chunk → embed → upsert → query path runs
//! without network access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use yanomami_rag::{
    Document, EmbeddingProvider, InMemoryIndex, IngestionPipeline, ParagraphChunker, Question,
    RagError, Result, RetrievalConfig, Retriever, SearchResult, VectorIndex,
};

const DIMENSIONS: usize = 64;

/// Deterministic bag-of-words embedder. Each distinct lowercase word is
/// assigned its own dimension in first-seen order, so identical texts
/// embed identically and word overlap drives cosine similarity.
struct BagOfWordsEmbedder {
    dimensions: usize,
    vocabulary: Mutex<HashMap<String, usize>>,
}

impl BagOfWordsEmbedder {
    fn new(dimensions: usize) -> Self {
        Self { dimensions, vocabulary: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dimensions];
        let mut vocabulary = self.vocabulary.lock().unwrap();
        for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            let next = vocabulary.len();
            let dim = *vocabulary.entry(word.to_string()).or_insert(next);
            assert!(dim < self.dimensions, "test vocabulary exceeded embedder dimensions");
            vector[dim] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// An embedder whose every call fails.
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::Embedding { provider: "stub".into(), message: "remote model down".into() })
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

/// An index whose every operation fails, as if unreachable.
struct UnreachableIndex;

#[async_trait]
impl VectorIndex for UnreachableIndex {
    async fn ensure_index(&self, _name: &str, _dimensions: usize) -> Result<()> {
        Err(RagError::VectorIndex { backend: "stub".into(), message: "unreachable".into() })
    }

    async fn upsert(&self, _name: &str, _records: &[yanomami_rag::IndexRecord]) -> Result<()> {
        Err(RagError::VectorIndex { backend: "stub".into(), message: "unreachable".into() })
    }

    async fn query(
        &self,
        _name: &str,
        _embedding: &[f32],
        _top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        Err(RagError::VectorIndex { backend: "stub".into(), message: "unreachable".into() })
    }
}

fn test_config(chunk_size: usize) -> RetrievalConfig {
    RetrievalConfig::builder()
        .index_name("test-kb")
        .dimensions(DIMENSIONS)
        .chunk_size(chunk_size)
        .batch_size(2)
        .top_k(5)
        .build()
        .unwrap()
}

fn pipeline(
    config: &RetrievalConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
) -> IngestionPipeline {
    IngestionPipeline::builder()
        .config(config.clone())
        .embedder(embedder)
        .index(index)
        .chunker(Arc::new(ParagraphChunker::new(config.chunk_size)))
        .build()
        .unwrap()
}

#[tokio::test]
async fn ingest_then_retrieve_ranks_by_word_overlap() {
    let config = test_config(20);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(BagOfWordsEmbedder::new(DIMENSIONS));
    let index = Arc::new(InMemoryIndex::new());

    let documents = [
        Document::new("phase1", "The sun is bright."),
        Document::new("phase2", "Water is wet."),
    ];
    let stored =
        pipeline(&config, embedder.clone(), index.clone()).ingest(&documents).await.unwrap();
    assert_eq!(stored, 2);

    let retriever = Retriever::new(config, embedder, index);
    let passages = retriever.retrieve(&Question::from("what is bright?")).await;

    assert_eq!(passages.len(), 2);
    assert_eq!(passages[0], "The sun is bright.");
    assert_eq!(passages[1], "Water is wet.");
}

#[tokio::test]
async fn ingested_chunk_is_retrievable_by_its_own_text() {
    let config = test_config(25);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(BagOfWordsEmbedder::new(DIMENSIONS));
    let index = Arc::new(InMemoryIndex::new());

    // One paragraph over the chunk limit, split at its sentence boundary.
    let documents = [Document::new("phase1", "The rain falls hard. Birds sing at dawn.")];
    pipeline(&config, embedder.clone(), index.clone()).ingest(&documents).await.unwrap();
    assert_eq!(index.len("test-kb").await, 2);

    let retriever = Retriever::new(config, embedder, index);
    let passages = retriever.retrieve(&Question::from("The rain falls hard.")).await;

    assert_eq!(passages.first().map(String::as_str), Some("The rain falls hard."));
}

#[tokio::test]
async fn record_ids_are_unique_across_batches() {
    let config = test_config(30);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(BagOfWordsEmbedder::new(DIMENSIONS));
    let index = Arc::new(InMemoryIndex::new());

    // Seven one-paragraph chunks across four batches of two.
    let text = (0..7).map(|i| format!("paragraph number {i} goes here.")).collect::<Vec<_>>();
    let documents = [Document::new("phase1", text.join("\n\n"))];

    let stored =
        pipeline(&config, embedder.clone(), index.clone()).ingest(&documents).await.unwrap();

    // Duplicate ids would overwrite each other and shrink the index.
    assert_eq!(stored, 7);
    assert_eq!(index.len("test-kb").await, 7);
}

#[tokio::test]
async fn empty_corpus_ingests_nothing() {
    let config = test_config(1000);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(BagOfWordsEmbedder::new(DIMENSIONS));
    let index = Arc::new(InMemoryIndex::new());

    let documents = [Document::new("phase1", ""), Document::new("phase2", "  \n\n ")];
    let stored =
        pipeline(&config, embedder.clone(), index.clone()).ingest(&documents).await.unwrap();

    assert_eq!(stored, 0);
    assert!(index.is_empty("test-kb").await);
}

#[tokio::test]
async fn ingestion_fails_fast_on_embedding_error() {
    let config = test_config(20);
    let index = Arc::new(InMemoryIndex::new());

    let documents = [Document::new("phase1", "Some text to ingest.")];
    let err = pipeline(&config, Arc::new(FailingEmbedder), index.clone())
        .ingest(&documents)
        .await
        .unwrap_err();

    assert!(matches!(err, RagError::Embedding { .. }));
    assert!(index.is_empty("test-kb").await);
}

#[tokio::test]
async fn ingestion_fails_fast_on_dimension_mismatch() {
    // Embedder produces 8-dimension vectors against a 64-dimension index.
    let config = test_config(20);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(BagOfWordsEmbedder::new(8));
    let index = Arc::new(InMemoryIndex::new());

    let documents = [Document::new("phase1", "Some text to ingest.")];
    let err =
        pipeline(&config, embedder, index.clone()).ingest(&documents).await.unwrap_err();

    assert!(matches!(err, RagError::Pipeline(_)));
    assert!(index.is_empty("test-kb").await);
}

#[tokio::test]
async fn retrieve_on_empty_index_returns_empty() {
    let config = test_config(1000);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(BagOfWordsEmbedder::new(DIMENSIONS));
    let retriever = Retriever::new(config, embedder, Arc::new(InMemoryIndex::new()));

    let passages = retriever.retrieve(&Question::from("anything at all")).await;
    assert!(passages.is_empty());
}

#[tokio::test]
async fn retrieve_degrades_to_empty_when_index_is_unreachable() {
    let config = test_config(1000);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(BagOfWordsEmbedder::new(DIMENSIONS));
    let retriever = Retriever::new(config, embedder, Arc::new(UnreachableIndex));

    let passages = retriever.retrieve(&Question::from("anything at all")).await;
    assert!(passages.is_empty());
}

#[tokio::test]
async fn retrieve_degrades_to_empty_when_embedding_fails() {
    let config = test_config(1000);
    let retriever =
        Retriever::new(config, Arc::new(FailingEmbedder), Arc::new(InMemoryIndex::new()));

    let passages = retriever.retrieve(&Question::from("anything at all")).await;
    assert!(passages.is_empty());
}

#[tokio::test]
async fn retrieve_accepts_fragment_questions() {
    let config = test_config(20);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(BagOfWordsEmbedder::new(DIMENSIONS));
    let index = Arc::new(InMemoryIndex::new());

    let documents = [Document::new("phase1", "The sun is bright.")];
    pipeline(&config, embedder.clone(), index.clone()).ingest(&documents).await.unwrap();

    let question: Question = serde_json::from_str(r#"["is the", {"text": "sun bright?"}]"#).unwrap();
    let retriever = Retriever::new(config, embedder, index);
    let passages = retriever.retrieve(&question).await;

    assert_eq!(passages.first().map(String::as_str), Some("The sun is bright."));
}

#[tokio::test]
async fn top_k_bounds_the_result_count() {
    let config = test_config(30);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(BagOfWordsEmbedder::new(DIMENSIONS));
    let index = Arc::new(InMemoryIndex::new());

    let text = (0..7).map(|i| format!("paragraph number {i} goes here.")).collect::<Vec<_>>();
    let documents = [Document::new("phase1", text.join("\n\n"))];
    pipeline(&config, embedder.clone(), index.clone()).ingest(&documents).await.unwrap();

    let retriever = Retriever::new(config, embedder, index);
    let passages = retriever.retrieve_top_k(&Question::from("paragraph number"), 3).await;
    assert_eq!(passages.len(), 3);
}
