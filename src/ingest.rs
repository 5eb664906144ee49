//! Deduplicating ingestion.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::CorpusConfig;
use crate::corpus::Corpus;
use crate::error::{CorpusError, Result};
use crate::reader::ReaderRegistry;
use crate::registry::{SourceRegistry, normalize_source};
use crate::split::split_text;
use crate::types::{
    EmbeddingIdentity, EmbeddingProvider, Fragment, FragmentMetadata, IngestReport,
};

/// Orchestrates the ingestion path: partition incoming fragments against
/// the source registry, embed what is new, merge it into the index, and
/// persist.
///
/// The ingestor loads the index once at [`open`](Ingestor::open) and keeps
/// it in memory across calls. Each [`ingest_batch`](Ingestor::ingest_batch)
/// persists exactly once at the end, so the durable store gains a batch
/// all-or-nothing; splitting one file's fragments across several calls is
/// what can leave it partially indexed, and callers own that decision.
pub struct Ingestor<'a, P: EmbeddingProvider + ?Sized> {
    config: &'a CorpusConfig,
    provider: &'a P,
    readers: ReaderRegistry,
    corpus: Option<Corpus>,
}

impl<P: EmbeddingProvider + ?Sized> std::fmt::Debug for Ingestor<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("config", &self.config)
            .field("corpus", &self.corpus)
            .finish_non_exhaustive()
    }
}

impl<'a, P: EmbeddingProvider + ?Sized> Ingestor<'a, P> {
    /// Open an ingestor over the configured store location.
    ///
    /// Loads the existing index when present and verifies it against the
    /// provider's model and dimension before any embedding cost is paid.
    pub fn open(config: &'a CorpusConfig, provider: &'a P) -> Result<Self> {
        config.validate()?;
        let corpus = Corpus::load(&config.store_dir)?;
        if let Some(corpus) = &corpus {
            corpus.verify_provider(provider)?;
        }
        Ok(Self {
            config,
            provider,
            readers: ReaderRegistry::default(),
            corpus,
        })
    }

    /// The loaded index, if one exists yet.
    pub fn corpus(&self) -> Option<&Corpus> {
        self.corpus.as_ref()
    }

    /// Ingest one file or one directory.
    ///
    /// A directory expands recursively to every supported, non-hidden file
    /// in sorted order, deduplicated by canonical path; the whole
    /// expansion feeds a single [`ingest_batch`](Ingestor::ingest_batch)
    /// call. A missing path is
    /// [`SourceNotFound`](CorpusError::SourceNotFound); a file no reader
    /// supports is [`UnsupportedSource`](CorpusError::UnsupportedSource).
    pub fn ingest_path(&mut self, path: &Path) -> Result<IngestReport> {
        let metadata = match fs_err::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CorpusError::SourceNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let files = if metadata.is_dir() {
            collect_files(path, &self.readers)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut fragments = Vec::new();
        for file in &files {
            fragments.extend(self.fragments_from_file(file)?);
        }
        self.ingest_batch(fragments)
    }

    /// Partition `fragments` against the registry, embed and merge the
    /// accepted ones, persist, and report.
    ///
    /// The registry snapshot is taken once and not updated mid-batch: two
    /// files new in the same batch are both accepted, and a file listed
    /// twice within one batch is accepted twice unless the caller
    /// pre-deduplicates. An all-skipped batch is an idempotent no-op with
    /// no index mutation and no write.
    pub fn ingest_batch(&mut self, fragments: Vec<Fragment>) -> Result<IngestReport> {
        let registry = SourceRegistry::from_corpus(self.corpus.as_ref());

        let mut accepted = Vec::new();
        let mut skipped = 0usize;
        for fragment in fragments {
            if registry.contains(&fragment.metadata.source) {
                skipped += 1;
                tracing::debug!(
                    source = %fragment.metadata.source.display(),
                    "fragment skipped; source already indexed"
                );
            } else {
                accepted.push(fragment);
            }
        }

        if accepted.is_empty() {
            tracing::info!(skipped, "nothing new to ingest");
            return Ok(IngestReport { added: 0, skipped });
        }

        let texts: Vec<&str> = accepted.iter().map(|f| f.text.as_str()).collect();
        let embeddings = self.provider.embed_batch(&texts)?;
        if embeddings.len() != accepted.len() {
            return Err(CorpusError::BatchMismatch {
                fragments: accepted.len(),
                embeddings: embeddings.len(),
            });
        }

        let added = accepted.len();
        match &mut self.corpus {
            Some(corpus) => {
                corpus.add(accepted, embeddings)?;
            }
            None => {
                let identity = EmbeddingIdentity::of(self.provider);
                self.corpus = Some(Corpus::from_fragments(accepted, embeddings, identity)?);
            }
        }

        // the in-memory index now carries the additions; a persistence
        // failure can be retried without re-embedding
        self.persist()?;

        tracing::info!(added, skipped, "ingestion complete");
        Ok(IngestReport { added, skipped })
    }

    /// Write the in-memory index to the store location.
    ///
    /// Runs automatically at the end of every non-empty batch; callers
    /// only need it to retry after a persistence failure.
    pub fn persist(&self) -> Result<()> {
        match &self.corpus {
            Some(corpus) => corpus.persist(&self.config.store_dir),
            None => Ok(()),
        }
    }

    /// Read one file into fragments carrying its canonical source.
    fn fragments_from_file(&self, path: &Path) -> Result<Vec<Fragment>> {
        let reader =
            self.readers
                .find_reader(path)
                .ok_or_else(|| CorpusError::UnsupportedSource {
                    path: path.to_path_buf(),
                })?;
        let canonical = normalize_source(path);
        let segments = reader.read(path)?;

        let mut fragments = Vec::new();
        for segment in segments {
            for piece in split_text(
                &segment.text,
                self.config.fragment_size,
                self.config.fragment_overlap,
            ) {
                let mut metadata = FragmentMetadata::new(canonical.clone());
                if let Some(page) = segment.page {
                    metadata = metadata.with_page(page);
                }
                fragments.push(Fragment::new(piece, metadata));
            }
        }
        tracing::debug!(
            source = %canonical.display(),
            fragments = fragments.len(),
            "source prepared"
        );
        Ok(fragments)
    }
}

/// Supported files under `root`, recursive, sorted, with hidden entries
/// skipped and duplicate identities (symlinked spellings) removed.
fn collect_files(root: &Path, readers: &ReaderRegistry) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs_err::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }
            let metadata = match fs_err::metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "skipping unreadable entry"
                    );
                    continue;
                }
            };
            if metadata.is_dir() {
                stack.push(path);
            } else if readers.supports(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    let mut seen = BTreeSet::new();
    files.retain(|path| seen.insert(normalize_source(path)));
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}
