#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::useless_vec,
        clippy::uninlined_format_args,
        clippy::cast_possible_truncation,
        clippy::float_cmp,
        clippy::cast_precision_loss
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Lint exceptions allowed project-wide:
//
// Documentation lints: internal helpers stay lightly documented; public
// APIs still carry proper docs.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Cast safety: dimensions and counts here are bounded far below u32;
// manifest fields fix the on-disk widths.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
//
// Pattern matching: these pedantic suggestions often reduce clarity.
#![allow(clippy::manual_let_else)]
#![allow(clippy::match_same_arms)]
//
// Low-value pedantic lints that add noise:
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::default_trait_access)]

/// The corpus-core crate version (matches `Cargo.toml`).
pub const CORPUS_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod corpus;
mod docstore;
pub mod error;
pub mod ingest;
pub mod io;
mod lock;
pub mod reader;
pub mod registry;
pub mod retrieve;
pub mod split;
pub mod types;
mod vec;

// SIMD-accelerated similarity kernels
pub mod simd;

// API-based embedding provider (Ollama) - requires network
#[cfg(feature = "api_embed")]
pub mod api_embed;

pub use config::{
    CorpusConfig, DEFAULT_EMBEDDING_DEVICE, DEFAULT_EMBEDDING_MODEL, DEFAULT_FRAGMENT_OVERLAP,
    DEFAULT_FRAGMENT_SIZE, DEFAULT_RETRIEVE_K,
};
pub use corpus::{Corpus, SearchHit};
pub use error::{CorpusError, Result};
pub use ingest::Ingestor;
pub use lock::StoreLock;
pub use reader::{DocumentReader, PdfReader, ReaderRegistry, SourceSegment, TextReader};
pub use registry::{SourceRegistry, normalize_source};
pub use retrieve::Retriever;
pub use split::split_text;
pub use types::{
    DOCSTORE_FILE, EmbeddingIdentity, EmbeddingProvider, Fragment, FragmentId, FragmentMetadata,
    IngestReport, MANIFEST_FILE, STORE_FORMAT_VERSION, SegmentMeta, StoreManifest, VECTORS_FILE,
    l2_normalize,
};

#[cfg(feature = "api_embed")]
pub use api_embed::{
    DEFAULT_EMBEDDING_DIMENSION, DEFAULT_OLLAMA_BASE_URL, OllamaConfig, OllamaEmbedder,
};
