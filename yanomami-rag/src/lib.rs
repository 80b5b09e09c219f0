//! Retrieval pipeline for the Yanomami language knowledge base.
//!
//! This crate answers natural-language questions about Yanomami
//! vocabulary and culture by retrieving relevant passages from a fixed
//! corpus, for a conversational collaborator to condition its generated
//! answer on (retrieval-augmented generation).
//!
//! Two workflows share the same building blocks:
//!
//! - **Ingestion** (offline, once per corpus): [`corpus::load_corpus`] →
//!   [`IngestionPipeline`] chunks the corpus with a [`Chunker`], embeds
//!   chunks through an [`EmbeddingProvider`], and upserts
//!   [`IndexRecord`]s into a [`VectorIndex`] in bounded batches.
//! - **Query** (per request): [`Retriever`] normalizes an incoming
//!   [`Question`], embeds it, and returns the top-K passage texts.
//!   It fails soft — any failure yields an empty passage list so the
//!   collaborator can still answer without context.
//!
//! Remote backends are capability traits so an [`InMemoryIndex`] and a
//! stub embedder can substitute in tests: the production pair is
//! [`OpenAiEmbedder`] ([`text-embedding-ada-002`], 1536 dimensions) and
//! [`PineconeIndex`] (cosine metric). The embedding model, dimension,
//! and metric are tied together: swapping the model requires rebuilding
//! the index.
//!
//! [`text-embedding-ada-002`]: https://platform.openai.com/docs/guides/embeddings

pub mod chunking;
pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod openai;
pub mod pinecone;
pub mod pipeline;
pub mod query;
pub mod question;
pub mod vectorstore;

pub use chunking::{Chunker, ParagraphChunker};
pub use config::{DEFAULT_DIMENSIONS, DEFAULT_INDEX_NAME, RetrievalConfig, RetrievalConfigBuilder};
pub use document::{Document, IndexRecord, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use inmemory::InMemoryIndex;
pub use openai::OpenAiEmbedder;
pub use pinecone::PineconeIndex;
pub use pipeline::{IngestionPipeline, IngestionPipelineBuilder};
pub use query::Retriever;
pub use question::{Fragment, FragmentObject, Question};
pub use vectorstore::VectorIndex;
