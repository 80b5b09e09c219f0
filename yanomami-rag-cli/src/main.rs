//! Command-line runner for the Yanomami knowledge-base retrieval pipeline.
//!
//! `ingest` rebuilds the remote index from the dataset directory;
//! `ask` runs a single retrieval and prints the ranked passages.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use yanomami_rag::{
    IngestionPipeline, OpenAiEmbedder, ParagraphChunker, PineconeIndex, Question,
    RetrievalConfig, Retriever, corpus,
};

/// Printed preview length per passage for `ask`.
const PREVIEW_CHARS: usize = 300;

#[derive(Parser)]
#[command(name = "yanomami-rag", about = "Yanomami knowledge-base retrieval", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the vector index from the corpus dataset.
    Ingest {
        /// Directory containing phase1_data.txt and phase2_data.txt.
        #[arg(long, default_value = "dataset")]
        dataset: PathBuf,
    },
    /// Retrieve the passages most relevant to a question.
    Ask {
        /// The question to retrieve context for.
        question: String,
        /// Number of passages to retrieve.
        #[arg(long, default_value_t = 5)]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = RetrievalConfig::default();

    let embedder = Arc::new(OpenAiEmbedder::from_env().context("failed to set up embedder")?);
    let index = Arc::new(PineconeIndex::from_env().context("failed to set up vector index")?);

    match cli.command {
        Command::Ingest { dataset } => {
            let documents = corpus::load_corpus(&dataset)
                .await
                .with_context(|| format!("failed to load corpus from {}", dataset.display()))?;

            let pipeline = IngestionPipeline::builder()
                .config(config.clone())
                .embedder(embedder)
                .index(index)
                .chunker(Arc::new(ParagraphChunker::new(config.chunk_size)))
                .build()?;

            let stored = pipeline.ingest(&documents).await.context("ingestion failed")?;
            info!(stored, index = %config.index_name, "ingestion finished");
            println!("Stored {stored} passages in index '{}'.", config.index_name);
        }
        Command::Ask { question, top_k } => {
            let retriever = Retriever::new(config, embedder, index);
            let passages =
                retriever.retrieve_top_k(&Question::from(question), top_k).await;

            if passages.is_empty() {
                println!("No relevant passages found.");
            } else {
                println!("Found {} relevant passages.", passages.len());
                for (rank, passage) in passages.iter().enumerate() {
                    let preview: String = passage.chars().take(PREVIEW_CHARS).collect();
                    let ellipsis = if passage.chars().count() > PREVIEW_CHARS { "..." } else { "" };
                    println!("\n--- Passage {} ---\n{preview}{ellipsis}", rank + 1);
                }
            }
        }
    }

    Ok(())
}
