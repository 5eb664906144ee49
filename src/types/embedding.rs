//! Embedding provider contract and the identity recorded per store.

use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};

/// Contract for turning text into fixed-dimension vectors.
///
/// Implementations must be deterministic for a fixed model configuration
/// and must return unit-normalized vectors so that cosine similarity
/// reduces to inner product. A backend failure surfaces as
/// [`ProviderUnavailable`](CorpusError::ProviderUnavailable); a zero
/// vector is never substituted silently.
pub trait EmbeddingProvider {
    /// Model identifier, recorded in the store manifest.
    fn model_name(&self) -> &str;

    /// Dimension of every vector this provider produces.
    fn dimension(&self) -> usize;

    /// Embed a single query or fragment text.
    fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of fragment texts.
    ///
    /// The default implementation loops over [`embed_query`]; providers
    /// with a native batch endpoint should override it.
    ///
    /// [`embed_query`]: EmbeddingProvider::embed_query
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed_query(text)).collect()
    }
}

/// Embedding identity a store was built with.
///
/// Persisted in the manifest and enforced whenever the store is opened
/// against a provider: a different model is [`ModelMismatch`], a different
/// dimension is [`DimensionMismatch`].
///
/// [`ModelMismatch`]: CorpusError::ModelMismatch
/// [`DimensionMismatch`]: CorpusError::DimensionMismatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingIdentity {
    pub model: String,
    pub dimension: u32,
    pub normalized: bool,
}

impl EmbeddingIdentity {
    pub fn new(model: impl Into<String>, dimension: u32) -> Self {
        Self {
            model: model.into(),
            dimension,
            normalized: true,
        }
    }

    /// Snapshot the identity of a provider.
    pub fn of<P: EmbeddingProvider + ?Sized>(provider: &P) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self::new(provider.model_name(), provider.dimension() as u32)
    }
}

/// Scale `vector` to unit length in place.
///
/// Rejects zero-magnitude input instead of producing NaNs; the caller is
/// normalizing provider output, so that is a provider failure.
pub fn l2_normalize(vector: &mut [f32]) -> Result<()> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Err(CorpusError::ProviderUnavailable {
            reason: "embedding has zero or non-finite magnitude".to_string(),
        });
    }
    for v in vector.iter_mut() {
        *v /= norm;
    }
    Ok(())
}
