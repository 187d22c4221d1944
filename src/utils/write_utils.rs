//! TIFF writing utilities
//!
//! Helpers for laying out data blocks when writing TIFF files.

use crate::tiff::errors::TiffResult;
use std::io::Write;

/// Align an offset to a 4-byte (word) boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    let remainder = offset % 4;
    if remainder == 0 {
        offset
    } else {
        offset + (4 - remainder)
    }
}

/// Write the padding bytes that bring `data_len` to a word boundary
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> TiffResult<()> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&[0u8; 3][..padding])?;
    }
    Ok(())
}

/// Padding needed after `data_len` bytes to reach a word boundary
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}
