//! Creation, loading, and persistence of the corpus store.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::docstore::Docstore;
use crate::error::{CorpusError, Result};
use crate::io::segment::{self, DOCSTORE_MAGIC, SegmentEncoding, VECTORS_MAGIC};
use crate::lock::StoreLock;
use crate::types::{
    DOCSTORE_FILE, EmbeddingIdentity, Fragment, FragmentId, MANIFEST_FILE, STORE_FORMAT_VERSION,
    StoreManifest, VECTORS_FILE,
};
use crate::vec::VecStore;

/// The vector index: a docstore of fragments, their embeddings, and the
/// embedding identity they were produced under.
///
/// Mutated only by [`add`](Corpus::add); persisted explicitly with
/// [`persist`](Corpus::persist); reconstructed with
/// [`load`](Corpus::load). The docstore and the vector store always hold
/// identical id sequences.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub(crate) docstore: Docstore,
    pub(crate) vectors: VecStore,
    pub(crate) identity: EmbeddingIdentity,
    pub(crate) next_id: FragmentId,
    pub(crate) created_at: DateTime<Utc>,
}

impl Corpus {
    /// An empty index bound to an embedding identity.
    pub fn new(identity: EmbeddingIdentity) -> Self {
        let dimension = identity.dimension;
        Self {
            docstore: Docstore::new(),
            vectors: VecStore::new(dimension),
            identity,
            next_id: 0,
            created_at: Utc::now(),
        }
    }

    /// A fresh index seeded with exactly `fragments` and `embeddings`.
    ///
    /// Fails with [`BatchMismatch`](CorpusError::BatchMismatch) when the
    /// sequences differ in length and
    /// [`DimensionMismatch`](CorpusError::DimensionMismatch) when any
    /// vector disagrees with the identity.
    pub fn from_fragments(
        fragments: Vec<Fragment>,
        embeddings: Vec<Vec<f32>>,
        identity: EmbeddingIdentity,
    ) -> Result<Self> {
        let mut corpus = Self::new(identity);
        corpus.add(fragments, embeddings)?;
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.docstore.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docstore.is_empty()
    }

    pub fn dimension(&self) -> u32 {
        self.identity.dimension
    }

    pub fn embedding_model(&self) -> &str {
        &self.identity.model
    }

    pub fn identity(&self) -> &EmbeddingIdentity {
        &self.identity
    }

    /// Stored fragments with their ids, in insertion order.
    ///
    /// This is the public capability the source registry is derived from.
    pub fn fragments(&self) -> impl Iterator<Item = (FragmentId, &Fragment)> {
        self.docstore.iter()
    }

    /// Docstore lookup by id.
    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.docstore.get(id)
    }

    /// Check that `provider` matches the identity this store was built
    /// with, before any embedding work is paid for.
    pub fn verify_provider<P: crate::types::EmbeddingProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<()> {
        if self.identity.model != provider.model_name() {
            return Err(CorpusError::ModelMismatch {
                expected: self.identity.model.clone(),
                actual: provider.model_name().to_string(),
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let actual = provider.dimension() as u32;
        if actual != self.identity.dimension {
            return Err(CorpusError::DimensionMismatch {
                expected: self.identity.dimension,
                actual,
            });
        }
        Ok(())
    }

    /// Write the full store to `dir`.
    ///
    /// Takes the store lock exclusively. Both segments are written before
    /// the manifest, and every file lands atomically; a crash mid-persist
    /// leaves a checksum disagreement that [`load`](Corpus::load) reports
    /// as corruption instead of silently mixing generations.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let _lock = StoreLock::exclusive(dir)?;

        let docstore_payload = segment::encode_value(&self.docstore)?;
        let docstore_meta = segment::write_segment(
            &dir.join(DOCSTORE_FILE),
            DOCSTORE_MAGIC,
            SegmentEncoding::Zstd,
            &docstore_payload,
        )?;
        let vectors_payload = segment::encode_value(&self.vectors)?;
        let vectors_meta = segment::write_segment(
            &dir.join(VECTORS_FILE),
            VECTORS_MAGIC,
            SegmentEncoding::Plain,
            &vectors_payload,
        )?;

        let manifest = StoreManifest {
            format_version: STORE_FORMAT_VERSION,
            identity: self.identity.clone(),
            fragment_count: self.docstore.len() as u64,
            next_fragment_id: self.next_id,
            docstore: docstore_meta,
            vectors: vectors_meta,
            created_at: self.created_at,
            updated_at: Utc::now(),
        };
        let manifest_json = serde_json::to_vec_pretty(&manifest)?;
        segment::write_atomic(&dir.join(MANIFEST_FILE), &manifest_json)?;

        tracing::info!(
            fragments = self.docstore.len(),
            dir = %dir.display(),
            "store persisted"
        );
        Ok(())
    }

    /// Read a store back from `dir`.
    ///
    /// `Ok(None)` when no store exists there yet; that is the expected
    /// first-run state, not an error. Everything else that prevents a
    /// faithful reconstruction is
    /// [`IndexCorrupt`](CorpusError::IndexCorrupt).
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            tracing::debug!(dir = %dir.display(), "no store present");
            return Ok(None);
        }
        let _lock = StoreLock::shared(dir)?;

        let manifest_bytes = fs_err::read(&manifest_path)?;
        let manifest: StoreManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|err| corrupt(dir, format!("manifest parse failed: {err}")))?;
        if manifest.format_version != STORE_FORMAT_VERSION {
            return Err(corrupt(
                dir,
                format!("unsupported format version {}", manifest.format_version),
            ));
        }

        let docstore_path = dir.join(DOCSTORE_FILE);
        let (docstore_payload, docstore_found) =
            segment::read_segment(&docstore_path, DOCSTORE_MAGIC)?;
        if docstore_found != manifest.docstore {
            return Err(corrupt(dir, "docstore segment does not match the manifest"));
        }
        let docstore: Docstore = segment::decode_value(&docstore_payload, &docstore_path)?;

        let vectors_path = dir.join(VECTORS_FILE);
        let (vectors_payload, vectors_found) =
            segment::read_segment(&vectors_path, VECTORS_MAGIC)?;
        if vectors_found != manifest.vectors {
            return Err(corrupt(dir, "vector segment does not match the manifest"));
        }
        let vectors: VecStore = segment::decode_value(&vectors_payload, &vectors_path)?;

        validate_store(dir, &manifest, &docstore, &vectors)?;

        tracing::debug!(
            fragments = docstore.len(),
            dimension = manifest.identity.dimension,
            dir = %dir.display(),
            "store loaded"
        );
        Ok(Some(Self {
            docstore,
            vectors,
            identity: manifest.identity,
            next_id: manifest.next_fragment_id,
            created_at: manifest.created_at,
        }))
    }
}

/// Cross-checks between manifest, docstore, and vector store.
fn validate_store(
    dir: &Path,
    manifest: &StoreManifest,
    docstore: &Docstore,
    vectors: &VecStore,
) -> Result<()> {
    if !vectors.is_consistent() {
        return Err(corrupt(dir, "vector data length disagrees with row count"));
    }
    if docstore.len() != vectors.len() {
        return Err(corrupt(
            dir,
            format!(
                "docstore holds {} fragment(s) but vector store holds {}",
                docstore.len(),
                vectors.len()
            ),
        ));
    }
    if docstore.len() as u64 != manifest.fragment_count {
        return Err(corrupt(
            dir,
            format!(
                "manifest counts {} fragment(s) but store holds {}",
                manifest.fragment_count,
                docstore.len()
            ),
        ));
    }
    if !docstore.ids().eq(vectors.ids()) {
        return Err(corrupt(dir, "docstore and vector store id sequences differ"));
    }
    if vectors.dimension() != manifest.identity.dimension {
        return Err(corrupt(
            dir,
            format!(
                "vector store dimension {} disagrees with identity dimension {}",
                vectors.dimension(),
                manifest.identity.dimension
            ),
        ));
    }
    if let Some(max_id) = docstore.max_id() {
        if manifest.next_fragment_id <= max_id {
            return Err(corrupt(
                dir,
                format!(
                    "next fragment id {} is not beyond the largest stored id {max_id}",
                    manifest.next_fragment_id
                ),
            ));
        }
    }
    Ok(())
}

fn corrupt(dir: &Path, reason: impl Into<String>) -> CorpusError {
    CorpusError::IndexCorrupt {
        path: dir.to_path_buf(),
        reason: reason.into(),
    }
}
