//! End-to-end ingestion and retrieval orchestration.
//!
//! The pipeline wires discovery, extraction, chunking, embedding, and
//! storage together. It is batch-oriented and fail-soft: a document that
//! cannot be extracted or embedded contributes zero chunks and the batch
//! moves on; only construction (bad configuration) can fail.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{RecursiveSplitter, chunk_pages};
use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::ingestion::{extract_pages, load_documents};
use crate::stores::{QueryHit, VectorStore};
use crate::types::{DocumentSource, PageMap, RagError};

/// Summary of one batch-ingestion run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents discovered in the source directory.
    pub documents_seen: usize,
    /// Documents that contributed no chunks (extraction failure, empty).
    pub documents_skipped: usize,
    /// Chunk records written to the store.
    pub chunks_written: usize,
}

/// Discover → extract → chunk → embed → upsert, and the query path back out.
pub struct IngestionPipeline<S> {
    splitter: RecursiveSplitter,
    provider: Arc<dyn EmbeddingProvider>,
    store: S,
}

impl<S: VectorStore> IngestionPipeline<S> {
    /// Builds a pipeline from validated configuration, an embedding
    /// provider, and an open store.
    pub fn new(
        config: &RagConfig,
        provider: Arc<dyn EmbeddingProvider>,
        store: S,
    ) -> Result<Self, RagError> {
        let splitter = RecursiveSplitter::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self {
            splitter,
            provider,
            store,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingests already-extracted page texts under the given document id.
    ///
    /// Returns the number of chunk records written. Embedding failures are
    /// logged and leave the store untouched.
    pub async fn ingest_pages(&self, doc_id: &str, pages: &PageMap) -> usize {
        let chunks = chunk_pages(pages, doc_id, &self.splitter);
        if chunks.is_empty() {
            info!(doc_id, "document produced no chunks");
            return 0;
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = match self.provider.embed_batch(&texts).await {
            Ok(embeddings) => embeddings,
            Err(err) => {
                error!(doc_id, error = %err, "embedding failed; nothing written");
                Vec::new()
            }
        };

        // An empty or short embedding list is rejected by the store as a
        // warned no-op, so a failed embed never causes a partial write.
        self.store.upsert(&chunks, &embeddings).await
    }

    /// Extracts and ingests a single document.
    pub async fn ingest_document(&self, source: &DocumentSource) -> usize {
        let pages = extract_pages(source);
        self.ingest_pages(&source.id, &pages).await
    }

    /// Ingests every document under `dir`, one at a time.
    ///
    /// Per-document failures are recovered and counted as skips; the batch
    /// always runs to completion.
    pub async fn ingest_directory(&self, dir: impl AsRef<Path>) -> IngestReport {
        let sources = load_documents(dir);
        let mut report = IngestReport {
            documents_seen: sources.len(),
            ..IngestReport::default()
        };

        for source in &sources {
            let written = self.ingest_document(source).await;
            if written == 0 {
                report.documents_skipped += 1;
            }
            report.chunks_written += written;
        }

        info!(
            documents = report.documents_seen,
            skipped = report.documents_skipped,
            chunks = report.chunks_written,
            "ingestion run complete"
        );
        report
    }

    /// Embeds `question` and returns the closest stored chunks.
    pub async fn retrieve(&self, question: &str, n_results: usize) -> Vec<QueryHit> {
        let embedding = match self.provider.embed_query(question).await {
            Ok(embedding) => embedding,
            Err(err) => {
                error!(error = %err, "query embedding failed");
                return Vec::new();
            }
        };
        self.store.query(&embedding, n_results).await
    }
}
