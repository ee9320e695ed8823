//! Environment-backed configuration for the ingestion pipeline.
//!
//! Every knob has a compiled-in default and an environment override; a
//! `.env` file is honored when present. Validation happens once at startup:
//! a bad overlap/size pair or an unparsable numeric override is a
//! [`RagError::Configuration`], not something the pipeline limps along with.

use std::path::PathBuf;

use crate::types::RagError;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_STORE_PATH: &str = "vector_store";
pub const DEFAULT_COLLECTION: &str = "audit_documents";
pub const DEFAULT_SOURCE_DIR: &str = "data/raw";

/// Pipeline configuration, resolved once per process.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters carried from the end of one chunk into the next.
    pub chunk_overlap: usize,
    /// Identifier of the sentence-embedding model.
    pub embedding_model: String,
    /// Directory holding the persistent collections.
    pub store_path: PathBuf,
    /// Logical name of the backing collection.
    pub collection: String,
    /// Directory scanned for source documents.
    pub source_dir: PathBuf,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            collection: DEFAULT_COLLECTION.to_string(),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
        }
    }
}

impl RagConfig {
    /// Resolves configuration from the environment, falling back to defaults.
    ///
    /// Loads `.env` if one is present, then reads `CHUNK_SIZE`,
    /// `CHUNK_OVERLAP`, `EMBEDDING_MODEL_NAME`, `VECTOR_STORE_PATH`,
    /// `VECTOR_STORE_COLLECTION_NAME`, and `PDF_SOURCE_DIR`.
    pub fn from_env() -> Result<Self, RagError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            chunk_size: env_usize("CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: env_usize("CHUNK_OVERLAP", defaults.chunk_overlap)?,
            embedding_model: env_string("EMBEDDING_MODEL_NAME", &defaults.embedding_model),
            store_path: PathBuf::from(env_string(
                "VECTOR_STORE_PATH",
                DEFAULT_STORE_PATH,
            )),
            collection: env_string("VECTOR_STORE_COLLECTION_NAME", &defaults.collection),
            source_dir: PathBuf::from(env_string("PDF_SOURCE_DIR", DEFAULT_SOURCE_DIR)),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects parameter combinations the splitter cannot honor.
    ///
    /// `chunk_overlap >= chunk_size` would make the merge window unable to
    /// advance, so it is a hard error rather than being silently clamped.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({}) must be strictly less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.collection.is_empty() {
            return Err(RagError::Configuration(
                "collection name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    #[must_use]
    pub fn with_store(mut self, path: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        self.store_path = path.into();
        self.collection = collection.into();
        self
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_usize(key: &str, default: usize) -> Result<usize, RagError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<usize>().map_err(|err| {
            RagError::Configuration(format!("{key} must be a non-negative integer: {err}"))
        }),
        Err(_) => Ok(default),
    }
}
