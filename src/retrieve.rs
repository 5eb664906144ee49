//! Query-side retrieval.

use crate::config::CorpusConfig;
use crate::corpus::{Corpus, SearchHit};
use crate::error::{CorpusError, Result};
use crate::types::{EmbeddingProvider, Fragment};

/// Embeds queries and ranks fragments against a loaded index.
///
/// The retrieval count comes from configuration at open time, not per
/// call. Opening fails with [`NoIndexAvailable`](CorpusError::NoIndexAvailable)
/// when nothing has been ingested yet, which callers must treat as
/// distinct from a query that merely matches nothing.
pub struct Retriever<'a, P: EmbeddingProvider + ?Sized> {
    corpus: Corpus,
    provider: &'a P,
    k: usize,
}

impl<P: EmbeddingProvider + ?Sized> std::fmt::Debug for Retriever<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("corpus", &self.corpus)
            .field("k", &self.k)
            .finish_non_exhaustive()
    }
}

impl<'a, P: EmbeddingProvider + ?Sized> Retriever<'a, P> {
    /// Load the index at the configured store location and verify it
    /// against the provider.
    pub fn open(config: &CorpusConfig, provider: &'a P) -> Result<Self> {
        config.validate()?;
        let corpus = Corpus::load(&config.store_dir)?.ok_or_else(|| {
            CorpusError::NoIndexAvailable {
                path: config.store_dir.clone(),
            }
        })?;
        corpus.verify_provider(provider)?;
        Ok(Self {
            corpus,
            provider,
            k: config.retrieve_k,
        })
    }

    /// The loaded index.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// The configured retrieval count.
    pub fn k(&self) -> usize {
        self.k
    }

    /// The top fragments for `query`, best first. At most the configured
    /// `k`; fewer when the index is smaller.
    pub fn retrieve(&self, query: &str) -> Result<Vec<Fragment>> {
        let hits = self.retrieve_scored(query)?;
        Ok(hits.into_iter().map(|hit| hit.fragment).collect())
    }

    /// Like [`retrieve`](Self::retrieve) but keeps ids and scores.
    pub fn retrieve_scored(&self, query: &str) -> Result<Vec<SearchHit>> {
        let embedding = self.provider.embed_query(query)?;
        let hits = self.corpus.search(&embedding, self.k)?;
        tracing::debug!(hits = hits.len(), k = self.k, "query answered");
        Ok(hits)
    }
}
