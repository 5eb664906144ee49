//! Fragment data model: the unit of indexing and retrieval.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a fragment when it enters the index.
///
/// Monotonically increasing, never reused, stable across persist/load.
pub type FragmentId = u64;

/// Typed metadata attached to every fragment.
///
/// `source` is required and stores the canonical path of the originating
/// file (see [`normalize_source`](crate::registry::normalize_source));
/// extensions are optional and typed rather than an open key/value map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentMetadata {
    /// Canonical path of the file this fragment came from.
    pub source: PathBuf,
    /// 1-based page number for paginated sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Optional document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl FragmentMetadata {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            page: None,
            title: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A bounded-size piece of source text plus its metadata.
///
/// Produced by a reader/splitter pair, immutable once created, owned by the
/// index docstore after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub metadata: FragmentMetadata,
}

impl Fragment {
    pub fn new(text: impl Into<String>, metadata: FragmentMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}
