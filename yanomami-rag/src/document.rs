//! Data types for corpus documents, index records, and search results.

use serde::{Deserialize, Serialize};

/// A raw corpus document loaded from a named source.
///
/// Created at ingestion start and discarded after chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Name of the source this text was loaded from (e.g. `phase1`).
    pub source: String,
    /// The full text content of the document.
    pub text: String,
}

impl Document {
    /// Create a new document from a source name and its text.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), text: text.into() }
    }
}

/// The persisted unit in the vector index.
///
/// `text` is the exact chunk text that produced `embedding`, so query
/// results can return human-readable passages rather than bare ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    /// Unique identifier within the index.
    pub id: String,
    /// The embedding vector for this record's text.
    pub embedding: Vec<f32>,
    /// The chunk text this record was built from.
    pub text: String,
}

/// A retrieved passage paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The id of the matching index record.
    pub id: String,
    /// The stored passage text.
    pub text: String,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
