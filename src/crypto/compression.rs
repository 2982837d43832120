//! Secret compression.
//!
//! Secrets run through a zlib stream before encryption, so large but
//! compressible files fit in smaller carriers. Compression happens before
//! encryption because ciphertext does not compress.

use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use std::io::Read;
use thiserror::Error;

/// Compression errors.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),
}

/// Compresses data into a zlib stream at the default level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = ZlibEncoder::new(data, Compression::default());
    let mut compressed = Vec::new();

    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;

    Ok(compressed)
}

/// Decompresses a zlib stream produced by [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CompressionError::DecompressionFailed(e.to_string()))?;

    Ok(decompressed)
}
