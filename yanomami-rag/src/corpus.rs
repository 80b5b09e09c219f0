//! Loading the knowledge-base corpus from the dataset directory.

use std::path::Path;

use tracing::info;

use crate::document::Document;
use crate::error::{RagError, Result};

/// File names of the corpus phases, in ingestion order.
const PHASE_FILES: [(&str, &str); 2] =
    [("phase1", "phase1_data.txt"), ("phase2", "phase2_data.txt")];

/// Load the corpus phases from `dataset_dir`.
///
/// Returns one [`Document`] per phase, in order. A read failure on any
/// phase is fatal to the ingestion run.
///
/// # Errors
///
/// Returns [`RagError::Load`] naming the unreadable source.
pub async fn load_corpus(dataset_dir: impl AsRef<Path>) -> Result<Vec<Document>> {
    let dataset_dir = dataset_dir.as_ref();
    let mut documents = Vec::with_capacity(PHASE_FILES.len());

    for (source, file_name) in PHASE_FILES {
        let path = dataset_dir.join(file_name);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|cause| RagError::Load { source_name: source.to_string(), cause })?;

        info!(source, chars = text.len(), "loaded corpus phase");
        documents.push(Document::new(source, text));
    }

    Ok(documents)
}
