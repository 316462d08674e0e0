//! Binary encoding of store files.
//!
//! The version marker is a bare bincode `u32`. Data files carry a header with
//! magic bytes and a checksum of the payload, so truncated or tampered files
//! are detected before the payload is decoded.

use std::path::Path;

use quire_common::ContentHash;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Magic bytes identifying a Quire store data file.
const DATA_MAGIC: [u8; 4] = *b"QUIR";

/// Upper bound on the bytes a decode may claim. A corrupt length prefix
/// fails against it instead of reaching the allocator.
const DECODE_LIMIT: usize = 1 << 30;

fn decoding() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<DECODE_LIMIT>()
}

/// Header prepended to every store data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataHeader {
    /// Magic bytes: must be `b"QUIR"`.
    pub magic: [u8; 4],

    /// Content hash of the payload.
    pub checksum: ContentHash,
}

fn serialization(path: &Path, e: impl ToString) -> StoreError {
    StoreError::Serialization {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Encodes a version marker.
pub fn encode_version(path: &Path, version: u32) -> Result<Vec<u8>, StoreError> {
    bincode::serde::encode_to_vec(version, bincode::config::standard())
        .map_err(|e| serialization(path, e))
}

/// Decodes a version marker.
pub fn decode_version(path: &Path, bytes: &[u8]) -> Result<u32, StoreError> {
    let (version, read) =
        bincode::serde::decode_from_slice::<u32, _>(bytes, decoding())
            .map_err(|e| serialization(path, e))?;
    if read != bytes.len() {
        return Err(serialization(path, "trailing bytes after version marker"));
    }
    Ok(version)
}

/// Encodes a value as header + payload.
///
/// Layout: 4-byte header length (little-endian), header, payload.
pub fn encode_data<T: Serialize>(path: &Path, value: &T) -> Result<Vec<u8>, StoreError> {
    let config = bincode::config::standard();
    let payload = bincode::serde::encode_to_vec(value, config).map_err(|e| serialization(path, e))?;

    let header = DataHeader {
        magic: DATA_MAGIC,
        checksum: ContentHash::from_bytes(&payload),
    };
    let header_bytes =
        bincode::serde::encode_to_vec(&header, config).map_err(|e| serialization(path, e))?;

    let header_len = header_bytes.len() as u32;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(&payload);
    Ok(output)
}

/// Validates the header of a data file and decodes its payload.
pub fn decode_data<T: DeserializeOwned>(path: &Path, raw: &[u8]) -> Result<T, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidHeader {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let len_bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| invalid("file too short for header length"))?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let header_bytes = raw
        .get(4..4 + header_len)
        .ok_or_else(|| invalid("file too short for header"))?;

    let (header, _): (DataHeader, usize) =
        bincode::serde::decode_from_slice(header_bytes, decoding())
            .map_err(|e| invalid(&e.to_string()))?;
    if header.magic != DATA_MAGIC {
        return Err(invalid("bad magic bytes"));
    }

    let payload = &raw[4 + header_len..];
    let actual = ContentHash::from_bytes(payload);
    if actual != header.checksum {
        return Err(StoreError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: header.checksum.to_string(),
            actual: actual.to_string(),
        });
    }

    if payload.len() > DECODE_LIMIT {
        return Err(serialization(path, "payload exceeds the decode limit"));
    }
    let (value, _) = bincode::serde::decode_from_slice(payload, decoding())
        .map_err(|e| serialization(path, e))?;
    Ok(value)
}
