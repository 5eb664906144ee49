//! PDF extraction via `lopdf`, one segment per page.

use std::path::Path;

use once_cell::sync::OnceCell;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{CorpusError, Result};
use crate::reader::{DocumentReader, SourceSegment, extension_matches};

/// Reads PDF files page by page. Page numbers in the resulting segments
/// are 1-based, matching how people cite them.
pub struct PdfReader;

impl DocumentReader for PdfReader {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn supports(&self, path: &Path) -> bool {
        extension_matches(path, &["pdf"])
    }

    fn read(&self, path: &Path) -> Result<Vec<SourceSegment>> {
        let document =
            lopdf::Document::load(path).map_err(|err| CorpusError::ExtractionFailed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

        let pages = document.get_pages();
        let page_count = pages.len();
        let mut segments = Vec::with_capacity(page_count);
        let mut failed = 0usize;
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(raw) => {
                    let text = normalize_extracted(&raw);
                    if !text.is_empty() {
                        segments.push(SourceSegment::new(text).with_page(*page_number));
                    }
                }
                Err(err) => {
                    failed += 1;
                    tracing::warn!(
                        path = %path.display(),
                        page = page_number,
                        error = %err,
                        "page extraction failed; skipping"
                    );
                }
            }
        }

        if page_count > 0 && failed == page_count {
            return Err(CorpusError::ExtractionFailed {
                path: path.to_path_buf(),
                reason: format!("all {page_count} pages failed to extract"),
            });
        }
        Ok(segments)
    }
}

/// NFC-normalize and tidy whitespace without flattening paragraph breaks:
/// runs of spaces and tabs become one space, three or more newlines become
/// a paragraph break, and line edges are trimmed.
fn normalize_extracted(raw: &str) -> String {
    static SPACE_RUNS: OnceCell<std::result::Result<Regex, String>> = OnceCell::new();
    static BLANK_RUNS: OnceCell<std::result::Result<Regex, String>> = OnceCell::new();

    let text: String = raw.nfc().collect();
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let space_runs = SPACE_RUNS
        .get_or_init(|| Regex::new(r"[ \t\u{a0}]+").map_err(|err| err.to_string()));
    let blank_runs =
        BLANK_RUNS.get_or_init(|| Regex::new(r"\n{3,}").map_err(|err| err.to_string()));
    let (space_runs, blank_runs) = match (space_runs, blank_runs) {
        (Ok(space), Ok(blank)) => (space, blank),
        (Err(msg), _) | (_, Err(msg)) => {
            tracing::error!(error = %msg, "whitespace regex init failed");
            return text.trim().to_string();
        }
    };

    let text = space_runs.replace_all(&text, " ");
    let text: String = text
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    blank_runs.replace_all(&text, "\n\n").trim().to_string()
}
