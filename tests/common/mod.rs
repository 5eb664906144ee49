//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use corpus_core::{CorpusConfig, CorpusError, EmbeddingProvider, Result, l2_normalize};
use tempfile::TempDir;

pub const DIM: usize = 16;

/// Deterministic text-sensitive provider: folds bytes into a fixed-width
/// vector and unit-normalizes, so identical text embeds identically and
/// a query equal to a fragment's text scores a perfect match.
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingProvider for StubEmbedder {
    fn model_name(&self) -> &str {
        "stub-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        if text.is_empty() {
            vector[0] = 1.0;
            return Ok(vector);
        }
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimension] += f32::from(byte) / 255.0;
        }
        l2_normalize(&mut vector)?;
        Ok(vector)
    }
}

/// Provider that refuses every call, as an unreachable backend would.
pub struct FailingEmbedder {
    dimension: usize,
}

impl FailingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingProvider for FailingEmbedder {
    fn model_name(&self) -> &str {
        "stub-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Err(CorpusError::ProviderUnavailable {
            reason: "backend offline".to_string(),
        })
    }
}

/// Config rooted under `dir` with small fragments so short fixtures split
/// into several pieces.
pub fn test_config(dir: &TempDir) -> CorpusConfig {
    CorpusConfig::at(dir.path().join("store"))
        .with_fragment_size(80)
        .with_fragment_overlap(10)
}

pub fn store_file(config: &CorpusConfig, name: &str) -> PathBuf {
    config.store_dir.join(name)
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// A few paragraphs, long enough to split into multiple fragments at the
/// sizes [`test_config`] uses.
pub fn sample_text(topic: &str) -> String {
    format!(
        "{topic} is the subject of this note. It covers the essentials in \
         plain language and keeps every sentence short.\n\n\
         The second paragraph adds more detail about {topic}, because one \
         paragraph is never enough for a fixture that needs to split.\n\n\
         Finally, a closing paragraph mentions {topic} once more so that \
         similarity search has something distinctive to latch onto."
    )
}
