use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CorpusError>;

/// Errors surfaced by the corpus core.
///
/// The core returns typed failures and never stringifies its own errors;
/// presentation layers decide how to render them. The only non-error empty
/// states are an absent store on [`load`](crate::Corpus::load) and zero
/// results on search.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CorpusError {
    /// Ingestion target path does not exist.
    #[error("source path not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Embedding backend unreachable or returned an unusable response.
    #[error("embedding provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },

    /// Persisted store exists but fails validation or deserialization.
    #[error("corrupt store at {path}: {reason}")]
    IndexCorrupt { path: PathBuf, reason: String },

    /// Query attempted before any successful ingestion.
    #[error("no index available at {path}; ingest documents first")]
    NoIndexAvailable { path: PathBuf },

    /// Vector dimensionality disagrees with the index.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: u32, actual: u32 },

    /// Configured embedding model disagrees with the one the store was
    /// built with.
    #[error("embedding model mismatch: store built with '{expected}', configured '{actual}'")]
    ModelMismatch { expected: String, actual: String },

    /// Fragment and embedding sequences differ in length.
    #[error("batch mismatch: {fragments} fragments but {embeddings} embeddings")]
    BatchMismatch { fragments: usize, embeddings: usize },

    /// No registered reader handles the file.
    #[error("unsupported source format: {path}")]
    UnsupportedSource { path: PathBuf },

    /// A reader failed to produce any text from the file.
    #[error("failed to extract text from {path}: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },

    /// Configuration rejected before any work was attempted.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Advisory store lock is held by another process.
    #[error("store lock unavailable: {0}")]
    Lock(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
