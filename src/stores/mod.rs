//! Persistent vector storage with similarity search.
//!
//! The [`VectorStore`] trait is the seam between the pipeline and a concrete
//! backend; [`sqlite::SqliteChunkStore`] is the shipped implementation,
//! backed by SQLite with the `sqlite-vec` extension.
//!
//! Failure semantics follow the operation boundary rule: once a store is
//! open, upsert and query failures are logged and degrade to a no-op or an
//! empty result. Only opening the store can fail fatally.

pub mod sqlite;

pub use sqlite::SqliteChunkStore;

use async_trait::async_trait;

use crate::types::DocumentChunk;

/// A single ranked query result.
#[derive(Clone, Debug)]
pub struct QueryHit {
    pub chunk: DocumentChunk,
    /// Cosine distance from the query embedding; smaller is closer.
    pub distance: f32,
}

/// Durable chunk storage keyed by chunk id, with nearest-neighbor lookup.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or replaces one record per chunk, keyed by `chunk_id`.
    ///
    /// `chunks` and `embeddings` must be the same non-zero length and
    /// positionally correspond; violated preconditions reject the whole call
    /// as a logged no-op with no partial writes. Returns the number of
    /// records written (zero on rejection or storage failure).
    async fn upsert(&self, chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> usize;

    /// Returns up to `n_results` records ranked by ascending cosine distance.
    ///
    /// An empty collection, an empty query embedding, or a storage failure
    /// all yield an empty list, never an error.
    async fn query(&self, query_embedding: &[f32], n_results: usize) -> Vec<QueryHit>;

    /// Number of records currently stored (zero on storage failure).
    async fn count(&self) -> usize;
}

/// Recovers a document id from a chunk id by stripping the trailing
/// `_chunk_{n}` suffix: split on `_`, drop the last two tokens, rejoin.
///
/// This mirrors the id convention of the chunker and is exact whenever the
/// document id contains no `_chunk_` substring of its own. Stored records
/// carry the document id explicitly, so lookups only fall back to this
/// inference for records written without one; treat the inferred value as
/// best-effort.
pub fn doc_id_from_chunk_id(chunk_id: &str) -> String {
    let parts: Vec<&str> = chunk_id.split('_').collect();
    if parts.len() <= 2 {
        return String::new();
    }
    parts[..parts.len() - 2].join("_")
}
