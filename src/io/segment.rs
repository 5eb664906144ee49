//! Checksummed binary segment files.
//!
//! Each segment carries a fixed header followed by its payload:
//!
//! ```text
//! [magic: 4][version: u16][encoding: u8][reserved: u8][payload_len: u64][blake3: 32][payload]
//! ```
//!
//! Integers are little-endian. The checksum covers the encoded (possibly
//! compressed) payload. Writes go through an atomic temp-and-rename, so a
//! crashed write never leaves a half-written segment behind; any header or
//! checksum violation on read surfaces as
//! [`IndexCorrupt`](CorpusError::IndexCorrupt).

use std::io::Write;
use std::path::Path;

use atomic_write_file::AtomicWriteFile;
use bincode::config::{self, Config};
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CorpusError, Result};
use crate::types::SegmentMeta;

/// Magic for the docstore segment.
pub const DOCSTORE_MAGIC: [u8; 4] = *b"CDOC";
/// Magic for the vector segment.
pub const VECTORS_MAGIC: [u8; 4] = *b"CVEC";
/// Segment format version.
pub const SEGMENT_VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 1 + 1 + 8 + 32;

/// Payload encoding recorded in the segment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEncoding {
    Plain = 0,
    Zstd = 1,
}

fn segment_config() -> impl Config {
    config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}

/// Serialize a payload value with the store's bincode configuration.
pub fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(encode_to_vec(value, segment_config())?)
}

/// Deserialize a payload previously produced by [`encode_value`].
///
/// Failures are reported as corruption of the file the payload came from.
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8], path: &Path) -> Result<T> {
    let (value, consumed) = decode_from_slice::<T, _>(bytes, segment_config())
        .map_err(|err| corrupt(path, format!("payload decode failed: {err}")))?;
    if consumed != bytes.len() {
        return Err(corrupt(
            path,
            format!(
                "payload has {} trailing byte(s) after decode",
                bytes.len() - consumed
            ),
        ));
    }
    Ok(value)
}

/// Write `payload` to `path` as a checksummed segment, atomically.
///
/// Returns the metadata the manifest records for this file.
pub fn write_segment(
    path: &Path,
    magic: [u8; 4],
    encoding: SegmentEncoding,
    payload: &[u8],
) -> Result<SegmentMeta> {
    let encoded = match encoding {
        SegmentEncoding::Plain => payload.to_vec(),
        SegmentEncoding::Zstd => zstd::encode_all(payload, zstd::DEFAULT_COMPRESSION_LEVEL)?,
    };
    let checksum = blake3::hash(&encoded);

    let mut bytes = Vec::with_capacity(HEADER_LEN + encoded.len());
    bytes.extend_from_slice(&magic);
    bytes.extend_from_slice(&SEGMENT_VERSION.to_le_bytes());
    bytes.push(encoding as u8);
    bytes.push(0);
    bytes.extend_from_slice(&(encoded.len() as u64).to_le_bytes());
    bytes.extend_from_slice(checksum.as_bytes());
    bytes.extend_from_slice(&encoded);

    write_atomic(path, &bytes)?;

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        "segment written"
    );
    Ok(SegmentMeta {
        bytes: bytes.len() as u64,
        checksum: checksum.to_hex().to_string(),
    })
}

/// Read and validate a segment, returning the decompressed payload and the
/// metadata actually found on disk.
pub fn read_segment(path: &Path, magic: [u8; 4]) -> Result<(Vec<u8>, SegmentMeta)> {
    let bytes = match fs_err::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(corrupt(path, "segment file missing"));
        }
        Err(err) => return Err(err.into()),
    };
    if bytes.len() < HEADER_LEN {
        return Err(corrupt(
            path,
            format!("truncated header ({} bytes)", bytes.len()),
        ));
    }

    if bytes[0..4] != magic {
        return Err(corrupt(path, "bad magic"));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != SEGMENT_VERSION {
        return Err(corrupt(path, format!("unsupported version {version}")));
    }
    let encoding = match bytes[6] {
        0 => SegmentEncoding::Plain,
        1 => SegmentEncoding::Zstd,
        other => return Err(corrupt(path, format!("unknown encoding {other}"))),
    };
    let payload_len = u64::from_le_bytes([
        bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    ]);
    let body = &bytes[HEADER_LEN..];
    if payload_len != body.len() as u64 {
        return Err(corrupt(
            path,
            format!(
                "payload length mismatch: header says {payload_len}, file holds {}",
                body.len()
            ),
        ));
    }

    let mut stored = [0u8; 32];
    stored.copy_from_slice(&bytes[16..48]);
    let computed = blake3::hash(body);
    if *computed.as_bytes() != stored {
        return Err(corrupt(path, "checksum mismatch"));
    }

    let payload = match encoding {
        SegmentEncoding::Plain => body.to_vec(),
        SegmentEncoding::Zstd => zstd::decode_all(body)
            .map_err(|err| corrupt(path, format!("zstd decode failed: {err}")))?,
    };
    Ok((
        payload,
        SegmentMeta {
            bytes: bytes.len() as u64,
            checksum: computed.to_hex().to_string(),
        },
    ))
}

/// Write `bytes` to `path` through a temp file and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut atomic = AtomicWriteFile::options().open(path)?;
    atomic.as_file_mut().write_all(bytes)?;
    atomic.as_file_mut().sync_all()?;
    atomic.commit()?;
    Ok(())
}

fn corrupt(path: &Path, reason: impl Into<String>) -> CorpusError {
    CorpusError::IndexCorrupt {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_round_trips_plain_and_zstd() {
        let dir = tempfile::tempdir().expect("tempdir");
        for encoding in [SegmentEncoding::Plain, SegmentEncoding::Zstd] {
            let path = dir.path().join(format!("seg-{}.bin", encoding as u8));
            let payload = b"the quick brown fox".repeat(64);
            let meta = write_segment(&path, DOCSTORE_MAGIC, encoding, &payload).expect("write");
            let (back, found) = read_segment(&path, DOCSTORE_MAGIC).expect("read");
            assert_eq!(back, payload);
            assert_eq!(found, meta);
        }
    }

    #[test]
    fn flipped_payload_byte_is_detected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seg.bin");
        write_segment(&path, VECTORS_MAGIC, SegmentEncoding::Plain, b"payload bytes")
            .expect("write");

        let mut bytes = std::fs::read(&path).expect("read raw");
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, &bytes).expect("write raw");

        let err = read_segment(&path, VECTORS_MAGIC).expect_err("corrupt");
        assert!(matches!(err, CorpusError::IndexCorrupt { .. }));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seg.bin");
        write_segment(&path, DOCSTORE_MAGIC, SegmentEncoding::Plain, b"abc").expect("write");
        let err = read_segment(&path, VECTORS_MAGIC).expect_err("magic mismatch");
        assert!(matches!(err, CorpusError::IndexCorrupt { .. }));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seg.bin");
        std::fs::write(&path, [0u8; 10]).expect("write raw");
        let err = read_segment(&path, DOCSTORE_MAGIC).expect_err("truncated");
        assert!(matches!(err, CorpusError::IndexCorrupt { .. }));
    }

    #[test]
    fn missing_segment_reports_corruption_not_io() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.bin");
        let err = read_segment(&path, DOCSTORE_MAGIC).expect_err("missing");
        assert!(matches!(err, CorpusError::IndexCorrupt { .. }));
    }

    #[test]
    fn values_round_trip_through_bincode() {
        let value: Vec<(u64, String)> = vec![(1, "one".into()), (2, "two".into())];
        let bytes = encode_value(&value).expect("encode");
        let back: Vec<(u64, String)> =
            decode_value(&bytes, Path::new("mem")).expect("decode");
        assert_eq!(back, value);
    }
}
