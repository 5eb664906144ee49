//! Source identity: which files are already indexed.
//!
//! The registry is never persisted. It is recomputed on demand by
//! projecting every stored fragment onto its `metadata.source`, so the
//! index remains the single source of truth and dedup survives process
//! restarts without an auxiliary file.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::corpus::Corpus;

/// Canonical form used to compare source paths.
///
/// Two paths refer to the same source iff their normalized forms are
/// equal: absolute, symlink-resolved, with `.`/`..` components removed.
/// When the file no longer exists on disk (so the OS cannot resolve it),
/// the form degrades to a lexical absolutization, which is stable for
/// paths that were canonical when stored.
pub fn normalize_source(path: &Path) -> PathBuf {
    match fs_err::canonicalize(path) {
        Ok(canonical) => canonical,
        Err(_) => lexical_absolute(path),
    }
}

fn lexical_absolute(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// The set of already-indexed source files, derived from the index.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    paths: BTreeSet<PathBuf>,
}

impl SourceRegistry {
    /// Build the registry from the current index; empty when no index
    /// exists yet.
    ///
    /// Uses only the corpus's public fragment iteration.
    pub fn from_corpus(corpus: Option<&Corpus>) -> Self {
        let mut paths = BTreeSet::new();
        if let Some(corpus) = corpus {
            for (_, fragment) in corpus.fragments() {
                paths.insert(normalize_source(&fragment.metadata.source));
            }
        }
        Self { paths }
    }

    /// Whether `path` names a source that is already indexed.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(&normalize_source(path))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}
