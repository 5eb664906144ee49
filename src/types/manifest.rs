//! Serialized store manifest.
//!
//! `corpus.json` is the small human-inspectable file binding the two binary
//! segments together. It is written last during persist, so a manifest
//! whose checksums disagree with the segment files on disk identifies a
//! torn persist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::embedding::EmbeddingIdentity;

/// Current on-disk format version.
pub const STORE_FORMAT_VERSION: u16 = 1;

/// Manifest file name inside the store directory.
pub const MANIFEST_FILE: &str = "corpus.json";
/// Docstore segment file name.
pub const DOCSTORE_FILE: &str = "docstore.bin";
/// Vector segment file name.
pub const VECTORS_FILE: &str = "vectors.bin";

/// Length and checksum of one persisted segment file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMeta {
    /// Total file length in bytes, header included.
    pub bytes: u64,
    /// blake3 of the encoded payload, lowercase hex.
    pub checksum: String,
}

/// Top-level store manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreManifest {
    pub format_version: u16,
    pub identity: EmbeddingIdentity,
    pub fragment_count: u64,
    pub next_fragment_id: u64,
    pub docstore: SegmentMeta,
    pub vectors: SegmentMeta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_round_trips_through_json() {
        let manifest = StoreManifest {
            format_version: STORE_FORMAT_VERSION,
            identity: EmbeddingIdentity::new("nomic-embed-text", 768),
            fragment_count: 12,
            next_fragment_id: 12,
            docstore: SegmentMeta {
                bytes: 4096,
                checksum: "ab".repeat(32),
            },
            vectors: SegmentMeta {
                bytes: 36864,
                checksum: "cd".repeat(32),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&manifest).expect("serialize");
        let back: StoreManifest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, manifest);
    }
}
