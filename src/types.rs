//! Core domain types shared across the ingestion and retrieval pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors surfaced by the pipeline.
///
/// Only two variants are fatal: [`RagError::Configuration`] (rejected at
/// startup) and [`RagError::StoreInit`] (a store that cannot open is unusable
/// for the rest of the process). Everything else is recovered at the
/// operation boundary and degrades to an empty result or a no-op.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    /// Malformed chunking parameters or an unusable storage location.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A source document could not be read or parsed.
    #[error("text extraction failed: {0}")]
    Extraction(String),

    /// The embedding provider failed to produce vectors.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The backing collection could not be opened or created.
    #[error("vector store initialization failed: {0}")]
    StoreInit(String),

    /// An upsert or query against an open store failed.
    #[error("vector store operation failed: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single ingestible document discovered on disk.
///
/// One instance per physical document, created at discovery time and never
/// mutated. The `id` is the filename stem and seeds every chunk id derived
/// from this document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    pub id: String,
    pub path: PathBuf,
}

impl DocumentSource {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// File name portion of the source path, for log output.
    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.id)
    }
}

/// Extracted page texts keyed by zero-based page index.
///
/// Ordered iteration gives page-major chunk emission. Produced once per
/// document by the extractor and consumed by the chunker; never persisted.
pub type PageMap = BTreeMap<usize, String>;

/// The unit of embedding and retrieval: a bounded slice of one page's text.
///
/// `chunk_id` has the form `"{doc_id}_chunk_{n}"` where `n` is a zero-based
/// sequence number assigned in emission order across the whole document.
/// `metadata` always carries `page_number` (one-based).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub doc_id: String,
    pub chunk_id: String,
    pub text: String,
    pub metadata: serde_json::Value,
}

impl DocumentChunk {
    /// One-based page the chunk text originated from, when recorded.
    pub fn page_number(&self) -> Option<u64> {
        self.metadata.get("page_number").and_then(|v| v.as_u64())
    }
}

impl std::fmt::Display for DocumentChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk(id={}, source={}, page={}, len={})",
            self.chunk_id,
            self.doc_id,
            self.page_number()
                .map_or_else(|| "N/A".to_string(), |p| p.to_string()),
            self.text.chars().count()
        )
    }
}
