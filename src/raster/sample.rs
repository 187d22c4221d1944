//! Sample layout and decoding
//!
//! Raw strip/tile bytes are turned into `f64` values in two steps: every
//! sample is read as a bit pattern in file byte order (so the horizontal
//! predictor can undo differencing with wrapping integer adds), then the
//! bit pattern is interpreted according to the sample format.

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::sample_format;
use crate::tiff::errors::{TiffError, TiffResult};

/// How a sample's bits are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Unsigned,
    Signed,
    Float,
}

/// Bit depth and interpretation shared by all bands of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLayout {
    pub bits: u16,
    pub kind: SampleKind,
}

impl SampleLayout {
    /// Build a layout from BitsPerSample and SampleFormat tag values
    ///
    /// Both tags may carry one value per band; mixed values are rejected.
    pub fn from_tags(bits_per_sample: &[u64], sample_formats: &[u64]) -> TiffResult<Self> {
        let bits = uniform(bits_per_sample, "BitsPerSample")?.unwrap_or(1);
        let format = uniform(sample_formats, "SampleFormat")?.unwrap_or(sample_format::UNSIGNED as u64);

        let kind = match format {
            f if f == sample_format::UNSIGNED as u64 => SampleKind::Unsigned,
            f if f == sample_format::SIGNED as u64 => SampleKind::Signed,
            f if f == sample_format::IEEEFP as u64 => SampleKind::Float,
            other => {
                return Err(TiffError::UnsupportedSampleLayout(format!("sample format {}", other)));
            }
        };

        let layout = SampleLayout { bits: bits as u16, kind };
        match (layout.kind, bits) {
            (SampleKind::Float, 32) | (SampleKind::Float, 64) => Ok(layout),
            (SampleKind::Float, _) => Err(TiffError::UnsupportedSampleLayout(
                format!("{}-bit floating point samples", bits))),
            (_, 8) | (_, 16) | (_, 32) | (_, 64) => Ok(layout),
            _ => Err(TiffError::UnsupportedSampleLayout(format!("{}-bit integer samples", bits))),
        }
    }

    /// Sample width in bytes
    pub fn bytes(&self) -> usize {
        self.bits as usize / 8
    }

    /// Mask of the significant bits in a sample bit pattern
    pub fn mask(&self) -> u64 {
        if self.bits >= 64 { u64::MAX } else { (1u64 << self.bits) - 1 }
    }

    /// Interpret a sample bit pattern as a value
    pub fn to_f64(&self, bits: u64) -> f64 {
        match (self.kind, self.bits) {
            (SampleKind::Unsigned, _) => bits as f64,
            (SampleKind::Signed, 8) => bits as u8 as i8 as f64,
            (SampleKind::Signed, 16) => bits as u16 as i16 as f64,
            (SampleKind::Signed, 32) => bits as u32 as i32 as f64,
            (SampleKind::Signed, _) => bits as i64 as f64,
            (SampleKind::Float, 32) => f32::from_bits(bits as u32) as f64,
            (SampleKind::Float, _) => f64::from_bits(bits),
        }
    }

    /// Inverse of `to_f64`, used when writing tiles
    pub fn from_f64(&self, value: f64) -> u64 {
        match (self.kind, self.bits) {
            (SampleKind::Float, 32) => (value as f32).to_bits() as u64,
            (SampleKind::Float, _) => value.to_bits(),
            (SampleKind::Signed, _) => (value as i64 as u64) & self.mask(),
            (SampleKind::Unsigned, _) => (value as u64) & self.mask(),
        }
    }

    /// TIFF SampleFormat code for this layout
    pub fn format_code(&self) -> u16 {
        match self.kind {
            SampleKind::Unsigned => sample_format::UNSIGNED,
            SampleKind::Signed => sample_format::SIGNED,
            SampleKind::Float => sample_format::IEEEFP,
        }
    }

    /// Split a decoded block into sample bit patterns
    pub fn unpack(&self, block: &[u8], byte_order: ByteOrder) -> Vec<u64> {
        let width = self.bytes();
        block.chunks_exact(width)
            .map(|chunk| byte_order.read_sample_bits(chunk, width))
            .collect()
    }
}

/// Returns the single value shared by all entries, `None` for an empty slice
fn uniform(values: &[u64], tag_name: &str) -> TiffResult<Option<u64>> {
    match values.split_first() {
        None => Ok(None),
        Some((first, rest)) if rest.iter().all(|v| v == first) => Ok(Some(*first)),
        Some(_) => Err(TiffError::UnsupportedSampleLayout(
            format!("{} differs between bands: {:?}", tag_name, values))),
    }
}

/// Undo horizontal differencing (TIFF predictor 2) in place
///
/// # Arguments
/// * `samples` - Sample bit patterns of one block, row-major
/// * `row_len` - Number of samples per block row
/// * `stride` - Samples per pixel within the block (1 for planar blocks)
/// * `mask` - Bit mask of the sample width
pub fn undo_horizontal_predictor(samples: &mut [u64], row_len: usize, stride: usize, mask: u64) {
    if row_len == 0 {
        return;
    }
    for row in samples.chunks_mut(row_len) {
        for i in stride..row.len() {
            row[i] = row[i].wrapping_add(row[i - stride]) & mask;
        }
    }
}

/// Apply horizontal differencing (TIFF predictor 2) in place, for writing
pub fn apply_horizontal_predictor(samples: &mut [u64], row_len: usize, stride: usize, mask: u64) {
    if row_len == 0 {
        return;
    }
    for row in samples.chunks_mut(row_len) {
        for i in (stride..row.len()).rev() {
            row[i] = row[i].wrapping_sub(row[i - stride]) & mask;
        }
    }
}
