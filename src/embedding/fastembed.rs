//! Local sentence-embedding provider backed by `fastembed` (ONNX runtime).

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use tracing::info;

use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::types::RagError;

/// Embeds text with a locally downloaded sentence-transformer model.
///
/// The model is loaded once at construction and reused for every call;
/// share the provider behind an `Arc` to keep a single copy per process.
/// The first construction downloads model weights into the fastembed cache.
pub struct FastembedProvider {
    model: Mutex<TextEmbedding>,
    model_id: String,
}

impl FastembedProvider {
    /// Loads the named model, failing fast on unknown identifiers.
    pub fn new(model_id: &str) -> Result<Self, RagError> {
        let model = resolve_model(model_id)?;
        info!(model = model_id, "loading embedding model");
        let embedding = TextEmbedding::try_new(
            InitOptions::new(model).with_show_download_progress(true),
        )
        .map_err(|err| RagError::Embedding(format!("failed to load '{model_id}': {err}")))?;
        info!(model = model_id, "embedding model ready");
        Ok(Self {
            model: Mutex::new(embedding),
            model_id: model_id.to_string(),
        })
    }

    pub fn from_config(config: &RagConfig) -> Result<Self, RagError> {
        Self::new(&config.embedding_model)
    }
}

/// Maps configuration identifiers onto fastembed's model catalog.
///
/// An unrecognized name is a configuration error at startup, not a fallback
/// to some other model.
fn resolve_model(model_id: &str) -> Result<EmbeddingModel, RagError> {
    match model_id {
        "all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-MiniLM-L12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "BAAI/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "BAAI/bge-large-en-v1.5" => Ok(EmbeddingModel::BGELargeENV15),
        other => Err(RagError::Configuration(format!(
            "unsupported embedding model '{other}'"
        ))),
    }
}

#[async_trait]
impl EmbeddingProvider for FastembedProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        info!(count = texts.len(), model = %self.model_id, "embedding text chunks");
        let mut model = self.model.lock();
        model
            .embed(texts.to_vec(), None)
            .map_err(|err| RagError::Embedding(err.to_string()))
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        let mut model = self.model.lock();
        model
            .embed(vec![query.to_string()], None)
            .map_err(|err| RagError::Embedding(err.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("model returned no embedding".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model_is_a_configuration_error() {
        assert!(matches!(
            resolve_model("definitely-not-a-model"),
            Err(RagError::Configuration(_))
        ));
    }

    #[test]
    fn known_models_resolve() {
        assert!(resolve_model("all-MiniLM-L6-v2").is_ok());
        assert!(resolve_model("BAAI/bge-small-en-v1.5").is_ok());
    }
}
