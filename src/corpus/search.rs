//! Exact similarity search over the corpus.

use smallvec::SmallVec;

use crate::error::{CorpusError, Result};
use crate::simd;
use crate::types::{Fragment, FragmentId};

use super::Corpus;

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: FragmentId,
    /// Inner product between the query and the stored vector. Equals
    /// cosine similarity when both are unit-normalized.
    pub score: f32,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    position: usize,
    score: f32,
}

impl Corpus {
    /// Brute-force inner-product search.
    ///
    /// Returns at most `k` hits ranked by descending score; all entries
    /// when the index holds fewer than `k`; an empty vec (not an error)
    /// when the index is empty. Ties rank earlier-inserted entries first,
    /// so results are deterministic. A query of the wrong dimension fails
    /// with [`DimensionMismatch`](CorpusError::DimensionMismatch).
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let expected = self.identity.dimension;
        #[allow(clippy::cast_possible_truncation)]
        let actual = query.len() as u32;
        if actual != expected {
            return Err(CorpusError::DimensionMismatch { expected, actual });
        }
        if k == 0 || self.docstore.is_empty() {
            return Ok(Vec::new());
        }

        let top = select_top_k(self.vectors.rows().map(|row| simd::dot(query, row)), k);
        let hits = top
            .into_iter()
            .filter_map(|candidate| {
                self.docstore.at(candidate.position).map(|entry| SearchHit {
                    id: entry.id,
                    score: candidate.score,
                    fragment: entry.fragment.clone(),
                })
            })
            .collect();
        Ok(hits)
    }
}

/// Keep the best `k` scores, descending; equal scores keep the earlier
/// position first.
fn select_top_k(scores: impl Iterator<Item = f32>, k: usize) -> SmallVec<[Candidate; 16]> {
    let mut best: SmallVec<[Candidate; 16]> = SmallVec::new();
    for (position, score) in scores.enumerate() {
        // equal scores sort after the entries already kept, which all have
        // earlier positions
        let insert_at = best.partition_point(|kept| kept.score >= score);
        if insert_at >= k {
            continue;
        }
        best.insert(insert_at, Candidate { position, score });
        if best.len() > k {
            best.truncate(k);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmbeddingIdentity, FragmentMetadata};

    fn seeded(vectors: Vec<Vec<f32>>) -> Corpus {
        let dimension = vectors.first().map_or(0, Vec::len);
        #[allow(clippy::cast_possible_truncation)]
        let identity = EmbeddingIdentity::new("test-model", dimension as u32);
        let fragments = (0..vectors.len())
            .map(|i| {
                Fragment::new(
                    format!("fragment {i}"),
                    FragmentMetadata::new(format!("/tmp/doc-{i}.txt")),
                )
            })
            .collect();
        Corpus::from_fragments(fragments, vectors, identity).expect("seeded corpus")
    }

    #[test]
    fn ranking_matches_hand_computed_inner_products() {
        // query . v0 = 0.96, query . v1 = -0.28, query . v2 = 0.6928
        let corpus = seeded(vec![
            vec![0.8, 0.6, 0.0],
            vec![0.6, -0.8, 0.0],
            vec![0.0, 0.866, 0.5],
        ]);
        let hits = corpus.search(&[0.6, 0.8, 0.0], 3).expect("search");
        let ids: Vec<FragmentId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 2, 1]);
        assert!((hits[0].score - 0.96).abs() < 1e-4);
        assert!((hits[1].score - 0.6928).abs() < 1e-4);
        assert!((hits[2].score + 0.28).abs() < 1e-4);
    }

    #[test]
    fn k_bounds_are_respected() {
        let corpus = seeded(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.7071, 0.7071],
        ]);
        assert_eq!(corpus.search(&[1.0, 0.0], 2).expect("k=2").len(), 2);
        assert_eq!(corpus.search(&[1.0, 0.0], 10).expect("k>n").len(), 3);
        assert!(corpus.search(&[1.0, 0.0], 0).expect("k=0").is_empty());
    }

    #[test]
    fn empty_index_returns_no_hits_not_an_error() {
        let corpus = Corpus::new(EmbeddingIdentity::new("test-model", 2));
        assert!(corpus.search(&[1.0, 0.0], 3).expect("search").is_empty());
    }

    #[test]
    fn ties_rank_earlier_insertions_first() {
        let corpus = seeded(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
        ]);
        let hits = corpus.search(&[1.0, 0.0], 3).expect("search");
        let ids: Vec<FragmentId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn wrong_dimension_query_is_rejected() {
        let corpus = seeded(vec![vec![1.0, 0.0]]);
        let err = corpus.search(&[1.0, 0.0, 0.0], 1).expect_err("mismatch");
        assert!(matches!(
            err,
            CorpusError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn select_top_k_keeps_order_under_duplicates() {
        let scores = vec![0.5, 0.9, 0.9, 0.1, 0.9];
        let top = select_top_k(scores.into_iter(), 4);
        let positions: Vec<usize> = top.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2, 4, 0]);
    }

    #[test]
    fn hits_carry_their_fragments() {
        let corpus = seeded(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let hits = corpus.search(&[0.0, 1.0], 1).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].fragment.text, "fragment 1");
    }
}
