//! Ingestion outcome reporting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one ingestion call.
///
/// `added` counts fragments embedded and merged into the index; `skipped`
/// counts fragments rejected because their source was already indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub added: usize,
    pub skipped: usize,
}

impl IngestReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.skipped
    }

    /// True when nothing was accepted and the store was left untouched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added == 0
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "added {} fragment(s), skipped {} duplicate(s)",
            self.added, self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_totals_and_noop() {
        let report = IngestReport {
            added: 0,
            skipped: 5,
        };
        assert_eq!(report.total(), 5);
        assert!(report.is_noop());
        assert_eq!(report.to_string(), "added 0 fragment(s), skipped 5 duplicate(s)");
    }
}
