//! Snapshot Codec
//!
//! bincode serialization wrapped in a gzip stream.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SnapshotError};

/// Serializes a value graph and compresses the result.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let raw = bincode::serialize(value).map_err(SnapshotError::Encode)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&raw)
        .map_err(SnapshotError::Compression)?;
    let compressed = encoder.finish().map_err(SnapshotError::Compression)?;

    debug!(
        uncompressed_bytes = raw.len(),
        compressed_bytes = compressed.len(),
        "snapshot encoded"
    );
    Ok(compressed)
}

/// Decompresses and deserializes bytes produced by `encode`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut decoder = GzDecoder::new(bytes);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(SnapshotError::Compression)?;

    debug!(
        compressed_bytes = bytes.len(),
        uncompressed_bytes = raw.len(),
        "snapshot decoded"
    );
    bincode::deserialize(&raw).map_err(SnapshotError::Decode)
}
