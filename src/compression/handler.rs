//! Compression handler trait definition

use crate::tiff::errors::TiffResult;

/// Strategy trait for encoding and decoding strip/tile blocks
pub trait CompressionHandler: Send + Sync {
    /// Decode one block
    ///
    /// `expected_len` is the uncompressed size of a full block. Decoders stop
    /// there; the decoded block may be shorter (last strip).
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>>;

    /// Encode one block
    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Human-readable name of the scheme
    fn name(&self) -> &'static str;

    /// TIFF compression code
    fn code(&self) -> u16;
}
