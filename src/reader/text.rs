//! Plain text and Markdown passthrough.

use std::path::Path;

use crate::error::{CorpusError, Result};
use crate::reader::{DocumentReader, SourceSegment, extension_matches};

/// Reads `.txt`, `.md`, and `.markdown` files as a single unpaged segment.
pub struct TextReader;

impl DocumentReader for TextReader {
    fn name(&self) -> &'static str {
        "text"
    }

    fn supports(&self, path: &Path) -> bool {
        extension_matches(path, &["txt", "md", "markdown"])
    }

    fn read(&self, path: &Path) -> Result<Vec<SourceSegment>> {
        let text = match fs_err::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                return Err(CorpusError::ExtractionFailed {
                    path: path.to_path_buf(),
                    reason: "not valid UTF-8".to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![SourceSegment::new(text)])
    }
}
