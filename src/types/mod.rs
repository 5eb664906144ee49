//! Public types exposed by the `corpus-core` crate.

pub mod embedding;
pub mod fragment;
pub mod ingest;
pub mod manifest;

pub use embedding::{EmbeddingIdentity, EmbeddingProvider, l2_normalize};
pub use fragment::{Fragment, FragmentId, FragmentMetadata};
pub use ingest::IngestReport;
pub use manifest::{
    DOCSTORE_FILE, MANIFEST_FILE, STORE_FORMAT_VERSION, SegmentMeta, StoreManifest, VECTORS_FILE,
};
