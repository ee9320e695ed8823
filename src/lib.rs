//! ```text
//! Source discovery ──► ingestion::load_documents ──► DocumentSource
//!                                                        │
//! DocumentSource ──► ingestion::extract_pages ──► PageMap (page → text)
//!                                                        │
//! PageMap ──► chunking::chunk_pages ─────► Vec<DocumentChunk>
//!                      │                          │
//!                      └─ RecursiveSplitter       ├─► embedding::EmbeddingProvider
//!                                                 │
//! (chunks, vectors) ──► stores::SqliteChunkStore::upsert
//!
//! question ──► embed_query ──► stores::query ──► ranked (chunk, distance)
//! ```
//!
//! Documents come in as PDFs, leave as bounded overlapping chunks with page
//! provenance, and are stored as vectors in a persistent cosine-distance
//! collection. The embedding model and the PDF parser are collaborators
//! behind narrow seams; swap either without touching the core.

pub mod chunking;
pub mod config;
pub mod embedding;
pub mod ingestion;
pub mod pipeline;
pub mod stores;
pub mod types;

pub use chunking::{RecursiveSplitter, chunk_pages};
pub use config::RagConfig;
pub use embedding::{EmbeddingProvider, MockEmbeddingProvider};
pub use pipeline::{IngestReport, IngestionPipeline};
pub use stores::{QueryHit, SqliteChunkStore, VectorStore};
pub use types::{DocumentChunk, DocumentSource, PageMap, RagError};

#[cfg(feature = "local-embeddings")]
pub use embedding::FastembedProvider;
