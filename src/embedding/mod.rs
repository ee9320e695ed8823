//! Embedding providers.
//!
//! The pipeline depends on the [`EmbeddingProvider`] trait, never on a
//! concrete model: the provider is constructed once per process and injected,
//! so model state is shared without any hidden globals. The default
//! implementation, `FastembedProvider`, runs a local sentence-embedding
//! model; [`MockEmbeddingProvider`] produces deterministic vectors for
//! tests.

#[cfg(feature = "local-embeddings")]
pub mod fastembed;

#[cfg(feature = "local-embeddings")]
pub use fastembed::FastembedProvider;

use async_trait::async_trait;

use crate::types::RagError;

/// Turns text into fixed-dimension vectors.
///
/// Batch and query embeddings must share one dimensionality; the store does
/// not reconcile mismatches. Implementations load whatever model state they
/// need once, at construction.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the underlying model, for log output.
    fn model_id(&self) -> &str;

    /// Embeds a batch of chunk texts, preserving order and length.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embeds a single query string.
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError>;
}

/// Deterministic hash-seeded embeddings for tests and offline runs.
///
/// Identical inputs always map to identical unit vectors, distinct inputs to
/// distinct ones; there is no semantic signal in the geometry.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbeddingProvider {
    pub const DEFAULT_DIMENSION: usize = 16;

    pub fn new() -> Self {
        Self {
            dimension: Self::DEFAULT_DIMENSION,
        }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        // FNV-1a seed, xorshift expansion, then L2 normalization.
        let mut state = text
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
            })
            .max(1);

        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state as f64 / u64::MAX as f64) as f32 - 0.5
            })
            .collect();

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn model_id(&self) -> &str {
        "mock"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.vector_for(query))
    }
}
