use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};

/// Default fragment size in characters.
pub const DEFAULT_FRAGMENT_SIZE: usize = 700;
/// Default overlap between consecutive fragments, in characters.
pub const DEFAULT_FRAGMENT_OVERLAP: usize = 50;
/// Default number of fragments returned per retrieval.
pub const DEFAULT_RETRIEVE_K: usize = 3;
/// Default embedding model identifier.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
/// Default compute device hint for local embedding providers.
pub const DEFAULT_EMBEDDING_DEVICE: &str = "cpu";

/// Runtime configuration for ingestion and retrieval.
///
/// Constructed once at process start and passed by reference into
/// [`Ingestor`](crate::Ingestor) and [`Retriever`](crate::Retriever).
/// Every option affects only forward work: changing the fragment size or
/// the embedding model does not re-embed entries already in the store, and
/// opening a store built with a different model fails with
/// [`ModelMismatch`](crate::CorpusError::ModelMismatch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding the persisted store.
    pub store_dir: PathBuf,
    /// Embedding model identifier, recorded in the store manifest.
    pub embedding_model: String,
    /// Compute device hint passed through to local embedding providers.
    pub embedding_device: String,
    /// Maximum fragment length in characters.
    pub fragment_size: usize,
    /// Characters of overlap carried between consecutive fragments.
    pub fragment_overlap: usize,
    /// Number of fragments returned per retrieval.
    pub retrieve_k: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_device: DEFAULT_EMBEDDING_DEVICE.to_string(),
            fragment_size: DEFAULT_FRAGMENT_SIZE,
            fragment_overlap: DEFAULT_FRAGMENT_OVERLAP,
            retrieve_k: DEFAULT_RETRIEVE_K,
        }
    }
}

impl CorpusConfig {
    /// Configuration rooted at `store_dir` with all other options at their
    /// defaults.
    pub fn at<P: AsRef<Path>>(store_dir: P) -> Self {
        Self {
            store_dir: store_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    #[must_use]
    pub fn with_embedding_device(mut self, device: impl Into<String>) -> Self {
        self.embedding_device = device.into();
        self
    }

    #[must_use]
    pub fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = size;
        self
    }

    #[must_use]
    pub fn with_fragment_overlap(mut self, overlap: usize) -> Self {
        self.fragment_overlap = overlap;
        self
    }

    #[must_use]
    pub fn with_retrieve_k(mut self, k: usize) -> Self {
        self.retrieve_k = k;
        self
    }

    /// Rejects configurations that cannot produce meaningful work.
    pub fn validate(&self) -> Result<()> {
        if self.embedding_model.trim().is_empty() {
            return Err(CorpusError::InvalidConfig {
                reason: "embedding_model must not be empty".to_string(),
            });
        }
        if self.fragment_size == 0 {
            return Err(CorpusError::InvalidConfig {
                reason: "fragment_size must be at least 1".to_string(),
            });
        }
        if self.fragment_overlap >= self.fragment_size {
            return Err(CorpusError::InvalidConfig {
                reason: format!(
                    "fragment_overlap ({}) must be smaller than fragment_size ({})",
                    self.fragment_overlap, self.fragment_size
                ),
            });
        }
        if self.retrieve_k == 0 {
            return Err(CorpusError::InvalidConfig {
                reason: "retrieve_k must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Platform data directory fallback used by [`CorpusConfig::default`].
fn default_store_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|dir| dir.join("corpus").join("store"))
        .unwrap_or_else(|| PathBuf::from("corpus-store"))
}
