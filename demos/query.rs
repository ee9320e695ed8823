//! Embeds a question and prints the closest stored chunks.
//!
//! ```bash
//! cargo run --example query -- "What did the 2023 audit conclude?"
//! ```

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use docsmith::{FastembedProvider, IngestionPipeline, RagConfig, SqliteChunkStore};

#[tokio::main]
async fn main() -> Result<(), docsmith::RagError> {
    init_tracing();

    let question: String = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if question.is_empty() {
        eprintln!("usage: query <question>");
        std::process::exit(2);
    }

    let config = RagConfig::from_env()?;
    let provider = Arc::new(FastembedProvider::from_config(&config)?);
    let store = SqliteChunkStore::from_config(&config).await?;
    let pipeline = IngestionPipeline::new(&config, provider, store)?;

    let hits = pipeline.retrieve(&question, 5).await;
    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        let page = hit
            .chunk
            .page_number()
            .map_or_else(|| "?".to_string(), |p| p.to_string());
        println!(
            "#{} [{:.4}] {} (page {page})",
            rank + 1,
            hit.distance,
            hit.chunk.chunk_id
        );
        let preview: String = hit.chunk.text.chars().take(160).collect();
        println!("    {}", preview.replace('\n', " "));
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}
