//! Appending fragments and their vectors.

use crate::error::{CorpusError, Result};
use crate::types::{Fragment, FragmentId};

use super::Corpus;

impl Corpus {
    /// Append `fragments` with their `embeddings` and return the freshly
    /// assigned ids.
    ///
    /// Ids are monotonic and never reused; existing entries are never
    /// disturbed. All guards run before the first append, so a failed add
    /// leaves the index exactly as it was.
    pub fn add(
        &mut self,
        fragments: Vec<Fragment>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Vec<FragmentId>> {
        if fragments.len() != embeddings.len() {
            return Err(CorpusError::BatchMismatch {
                fragments: fragments.len(),
                embeddings: embeddings.len(),
            });
        }
        let expected = self.identity.dimension;
        for vector in &embeddings {
            #[allow(clippy::cast_possible_truncation)]
            let actual = vector.len() as u32;
            if actual != expected {
                return Err(CorpusError::DimensionMismatch { expected, actual });
            }
        }

        let mut ids = Vec::with_capacity(fragments.len());
        for (fragment, vector) in fragments.into_iter().zip(embeddings) {
            let id = self.next_id;
            self.next_id += 1;
            self.docstore.push(id, fragment);
            self.vectors.push(id, &vector);
            ids.push(id);
        }
        tracing::debug!(
            added = ids.len(),
            total = self.docstore.len(),
            "fragments appended"
        );
        Ok(ids)
    }
}
