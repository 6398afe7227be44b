//! Saving and loading an [`InvertedIndex`].
//!
//! Binary layout:
//!
//! ```text
//! magic    "QRYX"       4 bytes
//! version  [1, 0]       2 bytes
//! length   u64 LE       8 bytes   payload length
//! checksum u32 LE       4 bytes   CRC32 of the payload
//! payload  bincode (serde, standard config) of the index
//! ```
//!
//! The JSON format is the plain serde_json document of the index. Loading
//! detects the format from the first bytes.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};
use crate::index::inverted::InvertedIndex;

/// Magic number of the binary index format.
pub const INDEX_MAGIC: &[u8; 4] = b"QRYX";

/// Current binary format version (major, minor).
pub const INDEX_VERSION: [u8; 2] = [1, 0];

const HEADER_LEN: usize = 4 + 2 + 8 + 4;

/// Encoding used for a persisted index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum StorageFormat {
    /// Checksummed bincode
    #[default]
    Binary,
    /// serde_json document
    Json,
}

impl InvertedIndex {
    /// Encode the index in the given format.
    pub fn to_bytes(&self, format: StorageFormat) -> Result<Vec<u8>> {
        match format {
            StorageFormat::Binary => {
                let payload = bincode::serde::encode_to_vec(self, bincode::config::standard())
                    .map_err(|e| {
                        QuarryError::serialization(format!("Failed to serialize index: {e}"))
                    })?;

                let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
                bytes.extend_from_slice(INDEX_MAGIC);
                bytes.extend_from_slice(&INDEX_VERSION);
                bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
                bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
                bytes.extend_from_slice(&payload);
                Ok(bytes)
            }
            StorageFormat::Json => Ok(serde_json::to_vec(self)?),
        }
    }

    /// Decode an index produced by [`InvertedIndex::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let index = match detect_format(bytes)? {
            StorageFormat::Binary => decode_binary(bytes)?,
            StorageFormat::Json => serde_json::from_slice(bytes)?,
        };
        index
            .validate()
            .map_err(|e| QuarryError::storage(format!("Corrupt index: {e}")))?;
        Ok(index)
    }

    /// Write the index to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: StorageFormat) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes(format)?;

        let mut output = BufWriter::new(File::create(path)?);
        output.write_all(&bytes)?;
        output.flush()?;

        info!(
            "Saved index with {} documents to {} ({} bytes, {:?})",
            self.document_count(),
            path.display(),
            bytes.len(),
            format
        );
        Ok(())
    }

    /// Read an index previously written with [`InvertedIndex::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let index = Self::from_bytes(&bytes)?;

        info!(
            "Loaded index with {} documents from {}",
            index.document_count(),
            path.display()
        );
        Ok(index)
    }
}

/// Guess the storage format of `bytes`.
pub fn detect_format(bytes: &[u8]) -> Result<StorageFormat> {
    if bytes.starts_with(INDEX_MAGIC) {
        return Ok(StorageFormat::Binary);
    }
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Ok(StorageFormat::Json),
        _ => Err(QuarryError::storage("Unrecognized index file format")),
    }
}

fn decode_binary(bytes: &[u8]) -> Result<InvertedIndex> {
    if bytes.len() < HEADER_LEN {
        return Err(QuarryError::storage("Index file is truncated"));
    }

    let version = [bytes[4], bytes[5]];
    if version[0] != INDEX_VERSION[0] {
        return Err(QuarryError::storage(format!(
            "Unsupported index version: {}.{}",
            version[0], version[1]
        )));
    }

    let mut length = [0u8; 8];
    length.copy_from_slice(&bytes[6..14]);
    let length = u64::from_le_bytes(length) as usize;

    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&bytes[14..18]);
    let checksum = u32::from_le_bytes(checksum);

    let payload = &bytes[HEADER_LEN..];
    if payload.len() != length {
        return Err(QuarryError::storage(format!(
            "Index payload length mismatch: expected {length}, found {}",
            payload.len()
        )));
    }
    if crc32fast::hash(payload) != checksum {
        return Err(QuarryError::storage("Index checksum mismatch"));
    }

    let (index, _): (InvertedIndex, _) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard()).map_err(|e| {
            QuarryError::serialization(format!("Failed to deserialize index: {e}"))
        })?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add_text("file:///a.html", "The quick brown fox");
        index.add_text("file:///b.html", "jumps over the lazy dog");
        index.add_text("file:///c.html", "");
        index
    }

    fn assert_same(left: &InvertedIndex, right: &InvertedIndex) {
        assert_eq!(left.universe(), right.universe());
        assert_eq!(left.stats(), right.stats());
        for word in left.words() {
            assert_eq!(left.get_documents(word), right.get_documents(word));
            for doc in left.documents() {
                assert_eq!(left.positions(word, doc), right.positions(word, doc));
            }
        }
    }

    #[test]
    fn test_binary_bytes() {
        let index = sample_index();
        let bytes = index.to_bytes(StorageFormat::Binary).unwrap();

        assert_eq!(&bytes[..4], INDEX_MAGIC);
        assert_eq!(detect_format(&bytes).unwrap(), StorageFormat::Binary);
        assert_same(&index, &InvertedIndex::from_bytes(&bytes).unwrap());
    }

    #[test]
    fn test_json_bytes() {
        let index = sample_index();
        let bytes = index.to_bytes(StorageFormat::Json).unwrap();

        assert_eq!(detect_format(&bytes).unwrap(), StorageFormat::Json);
        assert_same(&index, &InvertedIndex::from_bytes(&bytes).unwrap());
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut bytes = sample_index().to_bytes(StorageFormat::Binary).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;

        let err = InvertedIndex::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, QuarryError::Storage(_)));
    }

    #[test]
    fn test_truncated_and_garbage() {
        let bytes = sample_index().to_bytes(StorageFormat::Binary).unwrap();
        assert!(InvertedIndex::from_bytes(&bytes[..10]).is_err());
        assert!(InvertedIndex::from_bytes(&bytes[..bytes.len() - 3]).is_err());
        assert!(InvertedIndex::from_bytes(b"not an index").is_err());
        assert!(InvertedIndex::from_bytes(b"").is_err());
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = sample_index().to_bytes(StorageFormat::Binary).unwrap();
        bytes[4] = 9;
        let err = InvertedIndex::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("Unsupported index version"));
    }

    #[test]
    fn test_json_violating_invariants_is_rejected() {
        let json = br#"{"terms":{"ghost":{"nowhere":[1]}},"documents":{}}"#;
        let err = InvertedIndex::from_bytes(json).unwrap_err();
        assert!(matches!(err, QuarryError::Storage(_)));
    }
}
