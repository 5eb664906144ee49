//! Source readers.
//!
//! A [`DocumentReader`] turns one on-disk file into page-tagged text
//! segments; the [`ReaderRegistry`] picks the reader for a path by
//! extension. Splitting into fragments happens upstream, so readers stay
//! concerned with extraction only.

pub mod pdf;
pub mod text;

use std::path::Path;

use crate::error::Result;

pub use pdf::PdfReader;
pub use text::TextReader;

/// One extracted unit of text, tagged with the 1-based page it came from
/// when the format has pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSegment {
    pub text: String,
    pub page: Option<u32>,
}

impl SourceSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Extracts plain text from one source format.
pub trait DocumentReader: Send + Sync {
    /// Short format name for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this reader handles `path`, judged by extension.
    fn supports(&self, path: &Path) -> bool;

    /// Extract the file into segments, in document order.
    fn read(&self, path: &Path) -> Result<Vec<SourceSegment>>;
}

/// Ordered set of readers; the first one claiming a path wins.
pub struct ReaderRegistry {
    readers: Vec<Box<dyn DocumentReader>>,
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self {
            readers: vec![Box::new(PdfReader), Box::new(TextReader)],
        }
    }
}

impl ReaderRegistry {
    /// Registry with no readers; extend with [`register`](Self::register).
    pub fn empty() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Append a reader; earlier registrations take precedence.
    pub fn register(&mut self, reader: Box<dyn DocumentReader>) {
        self.readers.push(reader);
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.readers.iter().any(|r| r.supports(path))
    }

    pub fn find_reader(&self, path: &Path) -> Option<&dyn DocumentReader> {
        self.readers
            .iter()
            .find(|r| r.supports(path))
            .map(Box::as_ref)
    }
}

pub(crate) fn extension_matches(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_routes_by_extension() {
        let registry = ReaderRegistry::default();
        assert_eq!(
            registry.find_reader(Path::new("paper.pdf")).map(|r| r.name()),
            Some("pdf")
        );
        assert_eq!(
            registry.find_reader(Path::new("notes.MD")).map(|r| r.name()),
            Some("text")
        );
        assert!(registry.find_reader(Path::new("archive.zip")).is_none());
        assert!(!registry.supports(Path::new("archive.zip")));
    }

    #[test]
    fn empty_registry_supports_nothing() {
        let registry = ReaderRegistry::empty();
        assert!(!registry.supports(Path::new("paper.pdf")));
    }
}
