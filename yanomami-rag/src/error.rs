//! Error types for the `yanomami-rag` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// A corpus source file could not be read. Fatal to an ingestion run.
    #[error("Failed to load source '{source_name}': {cause}")]
    Load {
        /// The corpus source that could not be read.
        source_name: String,
        /// The underlying I/O error.
        #[source]
        cause: std::io::Error,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Index creation failed for a reason other than "already exists".
    #[error("Index provisioning error: {0}")]
    IndexProvision(String),

    /// An error occurred in the vector index backend.
    #[error("Vector index error ({backend}): {message}")]
    VectorIndex {
        /// The backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in the ingestion pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
