//! Handler for Zstandard compressed blocks

use log::warn;
use std::io::Read;

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// ZSTD compression handler (compression code 14)
pub struct ZstdHandler {
    /// Compression level (1-22)
    level: i32,
}

impl ZstdHandler {
    /// Create a handler with the default level (3)
    pub fn new() -> Self {
        Self::with_level(3)
    }

    /// Create a handler with the given level, clamped to 1..=22
    pub fn with_level(level: i32) -> Self {
        ZstdHandler { level: level.clamp(1, 22) }
    }
}

impl Default for ZstdHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for ZstdHandler {
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let mut decoded = Vec::with_capacity(expected_len);
        zstd::stream::read::Decoder::new(data)
            .and_then(|decoder| decoder.take(expected_len as u64).read_to_end(&mut decoded))
            .map_err(|e| {
                warn!("ZSTD decompression error: {}", e);
                TiffError::GenericError(format!("ZSTD decompression error: {}", e))
            })?;
        Ok(decoded)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        zstd::encode_all(data, self.level)
            .map_err(|e| TiffError::GenericError(format!("ZSTD compression error: {}", e)))
    }

    fn name(&self) -> &'static str {
        "ZSTD"
    }

    fn code(&self) -> u16 {
        compression::ZSTD
    }
}
