//! Strip and tile data extraction
//!
//! Stripped and tiled TIFFs are both read as a grid of blocks: a strip is
//! a block as wide as the image, a tile is a block of TileWidth ×
//! TileLength pixels. Planar images repeat the grid once per band.
//! Only the blocks a window touches are read and decoded.

use log::{debug, trace};
use ndarray::Array3;
use std::io::{Read, Seek, SeekFrom};

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{predictor as pred_consts, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::validation;

use super::sample::{self, SampleLayout};
use super::window::Window;

/// Largest number of samples a single decoded block may hold
const MAX_BLOCK_SAMPLES: usize = 1 << 28;

/// Geometry of the block grid of one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub image_width: usize,
    pub image_height: usize,
    pub block_width: usize,
    pub block_height: usize,
    pub blocks_across: usize,
    pub blocks_down: usize,
    pub samples_per_pixel: usize,
    pub planar: bool,
}

impl BlockLayout {
    /// Derive the block grid from an IFD
    ///
    /// Strips default to a single strip spanning the whole image when
    /// RowsPerStrip is absent.
    pub fn from_ifd(ifd: &IFD) -> TiffResult<Self> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        let (image_width, image_height) = (width as usize, height as usize);

        let (block_width, block_height) = if ifd.is_tiled() {
            let tile_width = ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(0) as usize;
            let tile_height = ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(0) as usize;
            (tile_width, tile_height)
        } else {
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .unwrap_or(height)
                .min(height.max(1)) as usize;
            (image_width, rows_per_strip)
        };

        Self::new(image_width, image_height, block_width, block_height,
                  ifd.get_samples_per_pixel() as usize, ifd.is_planar())
    }

    /// Build a layout from explicit dimensions
    pub fn new(image_width: usize, image_height: usize, block_width: usize, block_height: usize,
               samples_per_pixel: usize, planar: bool) -> TiffResult<Self> {
        if image_width == 0 || image_height == 0 {
            return Err(TiffError::MissingDimensions);
        }
        if block_width == 0 || block_height == 0 {
            return Err(TiffError::UnsupportedSampleLayout(
                format!("invalid block size {}x{}", block_width, block_height)));
        }
        if samples_per_pixel == 0 {
            return Err(TiffError::UnsupportedSampleLayout("zero samples per pixel".to_string()));
        }

        let oversized = || TiffError::UnsupportedSampleLayout(format!(
            "{}x{} blocks of {} samples over a {}x{} image are too large",
            block_width, block_height, samples_per_pixel, image_width, image_height));

        let blocks_across = image_width.div_ceil(block_width);
        let blocks_down = image_height.div_ceil(block_height);
        let planes = if planar { samples_per_pixel } else { 1 };
        planes.checked_mul(blocks_across)
            .and_then(|n| n.checked_mul(blocks_down))
            .ok_or_else(oversized)?;

        let block_samples = block_width.checked_mul(block_height)
            .and_then(|n| n.checked_mul(samples_per_pixel / planes))
            .ok_or_else(oversized)?;
        if block_samples > MAX_BLOCK_SAMPLES {
            return Err(oversized());
        }

        Ok(BlockLayout {
            image_width,
            image_height,
            block_width,
            block_height,
            blocks_across,
            blocks_down,
            samples_per_pixel,
            planar,
        })
    }

    /// Number of separately stored planes (1 for chunky data)
    pub fn planes(&self) -> usize {
        if self.planar { self.samples_per_pixel } else { 1 }
    }

    /// Samples stored per pixel inside one block
    pub fn samples_per_block_pixel(&self) -> usize {
        if self.planar { 1 } else { self.samples_per_pixel }
    }

    /// Total number of blocks the offsets table must list
    ///
    /// Cannot overflow, `new` checks the product.
    pub fn block_count(&self) -> usize {
        self.planes() * self.blocks_across * self.blocks_down
    }

    /// Index of a block in the offsets table
    pub fn block_index(&self, plane: usize, block_x: usize, block_y: usize) -> usize {
        plane * self.blocks_across * self.blocks_down + block_y * self.blocks_across + block_x
    }

    /// Number of samples in one block row
    pub fn block_row_len(&self) -> usize {
        self.block_width * self.samples_per_block_pixel()
    }
}

/// Reads windows of pixel data from the blocks of one image
pub struct BlockReader {
    layout: BlockLayout,
    sample: SampleLayout,
    byte_order: ByteOrder,
    predictor: u16,
    compression: Box<dyn CompressionHandler>,
    offsets: Vec<u64>,
    byte_counts: Vec<u64>,
    file_size: u64,
}

impl BlockReader {
    /// Create a block reader for an IFD
    ///
    /// Reads the offsets and byte count tables up front; blocks themselves
    /// are read on demand.
    ///
    /// # Arguments
    /// * `reader` - Seekable reader over the TIFF file
    /// * `tiff_reader` - TIFF reader that parsed the file header
    /// * `ifd` - IFD of the image to read
    /// * `byte_order` - Byte order of the file
    pub fn from_ifd(reader: &mut dyn SeekableReader, tiff_reader: &TiffReader, ifd: &IFD,
                    byte_order: ByteOrder) -> TiffResult<Self> {
        let layout = BlockLayout::from_ifd(ifd)?;

        let bits = tiff_reader.read_optional_tag_values(reader, ifd, tags::BITS_PER_SAMPLE)?
            .unwrap_or_else(|| vec![1]);
        let formats = tiff_reader.read_optional_tag_values(reader, ifd, tags::SAMPLE_FORMAT)?
            .unwrap_or_default();
        let sample = SampleLayout::from_tags(&bits, &formats)?;

        let compression = CompressionFactory::create_handler(
            ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1))?;

        let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(1) as u16;
        if predictor != pred_consts::NONE && predictor != pred_consts::HORIZONTAL_DIFFERENCING {
            return Err(TiffError::UnsupportedSampleLayout(format!("predictor {}", predictor)));
        }

        let (offsets_tag, counts_tag) = if ifd.is_tiled() {
            (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
        } else {
            (tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };
        let offsets = tiff_reader.read_tag_values(reader, ifd, offsets_tag)?;
        let byte_counts = tiff_reader.read_tag_values(reader, ifd, counts_tag)?;

        if offsets.len() != layout.block_count() || byte_counts.len() != layout.block_count() {
            return Err(TiffError::GenericError(format!(
                "Expected {} blocks, found {} offsets and {} byte counts",
                layout.block_count(), offsets.len(), byte_counts.len())));
        }

        let file_size = validation::get_file_size(reader)?;

        debug!("Block layout: {:?}, samples: {:?}, compression: {}, predictor: {}",
               layout, sample, compression.name(), predictor);

        Ok(BlockReader {
            layout,
            sample,
            byte_order,
            predictor,
            compression,
            offsets,
            byte_counts,
            file_size,
        })
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn sample_layout(&self) -> &SampleLayout {
        &self.sample
    }

    pub fn compression_name(&self) -> &'static str {
        self.compression.name()
    }

    /// Read a window of all bands
    ///
    /// The result has shape `(bands, window.height, window.width)`. Cells
    /// outside the image, and cells of sparse (zero-length) blocks, are 0.
    pub fn read_window(&self, reader: &mut dyn SeekableReader, window: &Window) -> TiffResult<Array3<f64>> {
        let layout = &self.layout;
        let mut out = Array3::<f64>::zeros((layout.samples_per_pixel, window.height, window.width));

        let (cols, rows) = match window.clip_to(layout.image_width, layout.image_height) {
            Some(ranges) => ranges,
            None => return Ok(out),
        };

        let first_bx = cols.start / layout.block_width;
        let last_bx = (cols.end - 1) / layout.block_width;
        let first_by = rows.start / layout.block_height;
        let last_by = (rows.end - 1) / layout.block_height;

        let spb = layout.samples_per_block_pixel();
        let row_len = layout.block_row_len();

        for plane in 0..layout.planes() {
            for by in first_by..=last_by {
                for bx in first_bx..=last_bx {
                    let index = layout.block_index(plane, bx, by);
                    let samples = self.read_block(reader, index)?;
                    let rows_available = samples.len() / row_len;

                    let x0 = bx * layout.block_width;
                    let y0 = by * layout.block_height;
                    let row_range = rows.start.max(y0)..rows.end.min(y0 + rows_available);
                    let col_range = cols.start.max(x0)..cols.end.min(x0 + layout.block_width);

                    for r in row_range {
                        let out_row = (r as i64 - window.row_off) as usize;
                        for c in col_range.clone() {
                            let out_col = (c as i64 - window.col_off) as usize;
                            let base = (r - y0) * row_len + (c - x0) * spb;

                            if layout.planar {
                                out[[plane, out_row, out_col]] = self.sample.to_f64(samples[base]);
                            } else {
                                for band in 0..spb {
                                    out[[band, out_row, out_col]] = self.sample.to_f64(samples[base + band]);
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(out)
    }

    /// Read, decompress and unpack one block into sample bit patterns
    ///
    /// Returns an empty vector for sparse blocks.
    fn read_block(&self, reader: &mut dyn SeekableReader, index: usize) -> TiffResult<Vec<u64>> {
        let offset = self.offsets[index];
        let byte_count = self.byte_counts[index];
        if byte_count == 0 {
            trace!("Block {} is sparse", index);
            return Ok(Vec::new());
        }
        validation::validate_block_extent(offset, byte_count, self.file_size)?;

        trace!("Reading block {} at offset {} with {} bytes", index, offset, byte_count);
        reader.seek(SeekFrom::Start(offset))?;
        let mut raw = vec![0u8; byte_count as usize];
        reader.read_exact(&mut raw)?;

        let expected_len = self.layout.block_row_len() * self.layout.block_height * self.sample.bytes();
        let decoded = self.compression.decompress(&raw, expected_len)?;
        let usable = decoded.len().min(expected_len);

        let mut samples = self.sample.unpack(&decoded[..usable], self.byte_order);
        if self.predictor == pred_consts::HORIZONTAL_DIFFERENCING {
            sample::undo_horizontal_predictor(&mut samples, self.layout.block_row_len(),
                                              self.layout.samples_per_block_pixel(), self.sample.mask());
        }

        Ok(samples)
    }
}
