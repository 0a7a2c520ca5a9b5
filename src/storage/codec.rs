// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! On-disk encoding of the two store artifacts.
//!
//! Index artifact layout, all integers little-endian:
//!
//! ```text
//! magic        4 bytes   "VSIX"
//! version      u16
//! flags        u16       reserved, written as 0
//! dimension    u32
//! count        u64       number of vectors
//! records_len  u64       byte length of the records artifact
//! records_hash 32 bytes  BLAKE3 of the records artifact
//! vectors      count * dimension f32, row-major
//! checksum     32 bytes  BLAKE3 of everything above
//! ```
//!
//! The records artifact is a pretty-printed JSON array of records. The index
//! header commits to its exact bytes, so the pair is only accepted when both
//! files come from the same save.

use crate::core::types::Record;
use crate::index::FlatIndex;
use crate::records::RecordStore;
use crate::storage::PersistenceError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

pub const INDEX_MAGIC: &[u8; 4] = b"VSIX";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 4 + 2 + 2 + 4 + 8 + 8 + 32;
pub const CHECKSUM_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHeader {
    pub version: u16,
    pub dimension: u32,
    pub count: u64,
    pub records_len: u64,
    pub records_hash: [u8; 32],
}

pub fn encode_records(records: &RecordStore) -> Result<Vec<u8>, PersistenceError> {
    serde_json::to_vec_pretty(records.as_slice())
        .map_err(|e| PersistenceError::Serialization(e.to_string()))
}

pub fn decode_records(raw: &[u8]) -> Result<Vec<Record>, PersistenceError> {
    serde_json::from_slice(raw).map_err(|e| {
        PersistenceError::Corrupt(format!("records artifact is not a valid record array: {}", e))
    })
}

/// Encode the index, binding it to the exact bytes of the records artifact.
pub fn encode_index(index: &FlatIndex, records_bytes: &[u8]) -> Result<Bytes, PersistenceError> {
    let dimension = index.dimension().unwrap_or(0);
    let dimension = u32::try_from(dimension).map_err(|_| {
        PersistenceError::Serialization(format!("dimension {} does not fit the format", dimension))
    })?;
    let data = index.as_slice();

    let mut buf = BytesMut::with_capacity(HEADER_LEN + data.len() * 4 + CHECKSUM_LEN);
    buf.put_slice(INDEX_MAGIC);
    buf.put_u16_le(FORMAT_VERSION);
    buf.put_u16_le(0);
    buf.put_u32_le(dimension);
    buf.put_u64_le(index.len() as u64);
    buf.put_u64_le(records_bytes.len() as u64);
    buf.put_slice(blake3::hash(records_bytes).as_bytes());
    for x in data {
        buf.put_f32_le(*x);
    }

    let checksum = blake3::hash(&buf);
    buf.put_slice(checksum.as_bytes());
    Ok(buf.freeze())
}

/// Decode and verify the index artifact.
pub fn decode_index(raw: &[u8]) -> Result<(IndexHeader, FlatIndex), PersistenceError> {
    if raw.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(PersistenceError::Corrupt(format!(
            "index artifact truncated: {} bytes",
            raw.len()
        )));
    }

    let (body, checksum) = raw.split_at(raw.len() - CHECKSUM_LEN);
    if blake3::hash(body).as_bytes()[..] != checksum[..] {
        return Err(PersistenceError::Corrupt(
            "index artifact checksum mismatch".to_string(),
        ));
    }

    let mut buf = body;
    let mut magic = [0u8; 4];
    buf.copy_to_slice(&mut magic);
    if &magic != INDEX_MAGIC {
        return Err(PersistenceError::Corrupt(format!(
            "bad index magic {:?}",
            String::from_utf8_lossy(&magic)
        )));
    }

    let version = buf.get_u16_le();
    if version == 0 || version > FORMAT_VERSION {
        return Err(PersistenceError::Corrupt(format!(
            "unsupported index format version {} (known 1..={})",
            version, FORMAT_VERSION
        )));
    }
    let _flags = buf.get_u16_le();
    let dimension = buf.get_u32_le();
    let count = buf.get_u64_le();
    let records_len = buf.get_u64_le();
    let mut records_hash = [0u8; 32];
    buf.copy_to_slice(&mut records_hash);

    let header = IndexHeader {
        version,
        dimension,
        count,
        records_len,
        records_hash,
    };

    if count > 0 && dimension == 0 {
        return Err(PersistenceError::Corrupt(format!(
            "index claims {} vectors of dimension 0",
            count
        )));
    }

    let floats = (dimension as u64)
        .checked_mul(count)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| PersistenceError::Corrupt("index size overflows".to_string()))?;
    let expected_bytes = floats
        .checked_mul(4)
        .ok_or_else(|| PersistenceError::Corrupt("index size overflows".to_string()))?;
    if buf.remaining() != expected_bytes {
        return Err(PersistenceError::Corrupt(format!(
            "index header promises {} vectors x {} dims ({} bytes) but payload has {} bytes",
            count,
            dimension,
            expected_bytes,
            buf.remaining()
        )));
    }

    let mut data = Vec::with_capacity(floats);
    for _ in 0..floats {
        data.push(buf.get_f32_le());
    }

    let index = if dimension == 0 {
        FlatIndex::new()
    } else {
        FlatIndex::from_raw(dimension as usize, data)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?
    };

    Ok((header, index))
}

/// Check that a records artifact is the one the index header was written with.
pub fn verify_records(header: &IndexHeader, records_bytes: &[u8]) -> Result<(), PersistenceError> {
    if records_bytes.len() as u64 != header.records_len {
        return Err(PersistenceError::Corrupt(format!(
            "records artifact is {} bytes, index expects {}",
            records_bytes.len(),
            header.records_len
        )));
    }
    if blake3::hash(records_bytes).as_bytes() != &header.records_hash {
        return Err(PersistenceError::Corrupt(
            "records artifact does not match the index it was saved with".to_string(),
        ));
    }
    Ok(())
}
