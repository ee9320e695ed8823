//! Batch-ingests a directory of PDFs into the vector store.
//!
//! ```bash
//! PDF_SOURCE_DIR=./data/raw cargo run --example ingest
//! ```
//!
//! Configuration comes from the environment (or a `.env` file); see
//! `RagConfig` for the knobs and their defaults.

use std::sync::Arc;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use docsmith::{FastembedProvider, IngestionPipeline, RagConfig, SqliteChunkStore, VectorStore};

#[tokio::main]
async fn main() -> Result<(), docsmith::RagError> {
    init_tracing();

    let config = RagConfig::from_env()?;
    println!(
        "Ingesting from {} into collection '{}'",
        config.source_dir.display(),
        config.collection
    );

    let provider = Arc::new(FastembedProvider::from_config(&config)?);
    let store = SqliteChunkStore::from_config(&config).await?;
    let pipeline = IngestionPipeline::new(&config, provider, store)?;

    let start = Instant::now();
    let report = pipeline.ingest_directory(&config.source_dir).await;

    println!("\nIngestion complete in {:.1?}", start.elapsed());
    println!("  documents seen    : {}", report.documents_seen);
    println!("  documents skipped : {}", report.documents_skipped);
    println!("  chunks written    : {}", report.chunks_written);
    println!("  collection count  : {}", pipeline.store().count().await);

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
