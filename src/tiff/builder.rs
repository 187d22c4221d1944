//! GeoTIFF file construction
//!
//! Writes a single-image, multi-band GeoTIFF from a `(bands, rows, cols)`
//! array. Layout, byte order, sample type and compression are all
//! selectable so the reader can be exercised against every combination
//! it supports.
//!
//! File layout: header, data blocks, out-of-line tag values, then the IFD.
//! The first IFD offset in the header is patched once the IFD position is
//! known.

use log::{debug, info};
use ndarray::Array3;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use crate::compression::CompressionFactory;
use crate::io::byte_order::ByteOrder;
use crate::raster::block_reader::BlockLayout;
use crate::raster::sample::{self, SampleKind, SampleLayout};
use crate::raster::transform::GeoTransform;
use crate::tiff::constants::{compression, field_types, geo_keys, header, photometric, planar_config, predictor, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::write_utils;

/// How pixel data is divided into blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    /// Full-width strips of `rows_per_strip` rows
    Strips { rows_per_strip: usize },
    /// Tiles of `width` × `height` pixels
    Tiles { width: usize, height: usize },
}

/// Value of a tag being written
#[derive(Debug, Clone, PartialEq)]
enum TagValue {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Long8(Vec<u64>),
    Double(Vec<f64>),
}

impl TagValue {
    fn field_type(&self) -> u16 {
        match self {
            TagValue::Short(_) => field_types::SHORT,
            TagValue::Long(_) => field_types::LONG,
            TagValue::Long8(_) => field_types::LONG8,
            TagValue::Double(_) => field_types::DOUBLE,
        }
    }

    fn count(&self) -> u64 {
        match self {
            TagValue::Short(v) => v.len() as u64,
            TagValue::Long(v) => v.len() as u64,
            TagValue::Long8(v) => v.len() as u64,
            TagValue::Double(v) => v.len() as u64,
        }
    }

    fn encode(&self, byte_order: ByteOrder) -> TiffResult<Vec<u8>> {
        let mut bytes = Vec::new();
        match self {
            TagValue::Short(values) => for v in values {
                byte_order.write_sample_bits(&mut bytes, *v as u64, 2)?;
            },
            TagValue::Long(values) => for v in values {
                byte_order.write_sample_bits(&mut bytes, *v as u64, 4)?;
            },
            TagValue::Long8(values) => for v in values {
                byte_order.write_sample_bits(&mut bytes, *v, 8)?;
            },
            TagValue::Double(values) => for v in values {
                byte_order.write_sample_bits(&mut bytes, v.to_bits(), 8)?;
            },
        }
        Ok(bytes)
    }
}

/// Builder for GeoTIFF tiles
#[derive(Debug, Clone)]
pub struct GeoTiffBuilder {
    data: Array3<f64>,
    transform: GeoTransform,
    sample: SampleLayout,
    byte_order: ByteOrder,
    big_tiff: bool,
    blocks: BlockShape,
    planar: bool,
    compression: u16,
    predictor: bool,
    model_transformation: bool,
    pixel_is_point: bool,
}

impl GeoTiffBuilder {
    /// Start a builder for `(bands, rows, cols)` data
    ///
    /// Defaults: 16-bit unsigned samples, little-endian classic TIFF,
    /// 16-row strips, interleaved bands, no compression, no predictor,
    /// georeference written as tiepoint + pixel scale, PixelIsArea.
    pub fn new(data: Array3<f64>, transform: GeoTransform) -> Self {
        GeoTiffBuilder {
            data,
            transform,
            sample: SampleLayout { bits: 16, kind: SampleKind::Unsigned },
            byte_order: ByteOrder::LittleEndian,
            big_tiff: false,
            blocks: BlockShape::Strips { rows_per_strip: 16 },
            planar: false,
            compression: compression::NONE,
            predictor: false,
            model_transformation: false,
            pixel_is_point: false,
        }
    }

    pub fn sample_layout(mut self, sample: SampleLayout) -> Self {
        self.sample = sample;
        self
    }

    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn big_tiff(mut self, big_tiff: bool) -> Self {
        self.big_tiff = big_tiff;
        self
    }

    pub fn strips(mut self, rows_per_strip: usize) -> Self {
        self.blocks = BlockShape::Strips { rows_per_strip };
        self
    }

    pub fn tiles(mut self, width: usize, height: usize) -> Self {
        self.blocks = BlockShape::Tiles { width, height };
        self
    }

    pub fn planar(mut self, planar: bool) -> Self {
        self.planar = planar;
        self
    }

    /// Set the TIFF compression code (1, 8 or 14)
    pub fn compression(mut self, code: u16) -> Self {
        self.compression = code;
        self
    }

    /// Apply horizontal differencing before compression
    pub fn predictor(mut self, enabled: bool) -> Self {
        self.predictor = enabled;
        self
    }

    /// Write the georeference as a ModelTransformation matrix
    pub fn model_transformation(mut self, enabled: bool) -> Self {
        self.model_transformation = enabled;
        self
    }

    /// Mark the tile PixelIsPoint, tying the georeference to pixel centers
    ///
    /// The transform passed to `new` still describes pixel corners; the
    /// written tiepoint is moved half a pixel inwards.
    pub fn pixel_is_point(mut self, enabled: bool) -> Self {
        self.pixel_is_point = enabled;
        self
    }

    fn layout(&self) -> TiffResult<BlockLayout> {
        let (bands, height, width) = self.data.dim();
        let (block_width, block_height) = match self.blocks {
            BlockShape::Strips { rows_per_strip } => (width, rows_per_strip.min(height)),
            BlockShape::Tiles { width, height } => (width, height),
        };
        BlockLayout::new(width, height, block_width, block_height, bands, self.planar)
    }

    /// Encode the file into memory
    pub fn to_bytes(&self) -> TiffResult<Vec<u8>> {
        let layout = self.layout()?;
        if self.predictor && self.sample.kind == SampleKind::Float {
            return Err(TiffError::UnsupportedSampleLayout(
                "horizontal predictor on floating point samples".to_string()));
        }
        let handler = CompressionFactory::create_handler(self.compression as u64)?;

        let mut out = Cursor::new(Vec::new());
        self.write_header(&mut out)?;

        let mut offsets = Vec::with_capacity(layout.block_count());
        let mut byte_counts = Vec::with_capacity(layout.block_count());
        for plane in 0..layout.planes() {
            for by in 0..layout.blocks_down {
                for bx in 0..layout.blocks_across {
                    let block = self.encode_block(&layout, plane, bx, by)?;
                    let compressed = handler.compress(&block)?;
                    offsets.push(out.position());
                    byte_counts.push(compressed.len() as u64);
                    out.write_all(&compressed)?;
                    write_utils::write_padding(&mut out, compressed.len())?;
                }
            }
        }
        debug!("Wrote {} blocks with {} compression", offsets.len(), handler.name());

        let entries = self.entries(&layout, offsets, byte_counts)?;
        let ifd_offset = self.write_ifd(&mut out, &entries)?;

        out.seek(SeekFrom::Start(if self.big_tiff { 8 } else { 4 }))?;
        self.write_offset(&mut out, ifd_offset)?;

        Ok(out.into_inner())
    }

    /// Write the file to disk
    pub fn write(&self, path: &Path) -> TiffResult<()> {
        info!("Writing GeoTIFF to {}", path.display());
        let bytes = self.to_bytes()?;
        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the header with a zero first-IFD offset
    fn write_header(&self, writer: &mut impl Write) -> TiffResult<()> {
        writer.write_all(&self.byte_order.marker())?;
        if self.big_tiff {
            self.byte_order.write_sample_bits(writer, header::BIG_TIFF_VERSION as u64, 2)?;
            self.byte_order.write_sample_bits(writer, header::BIGTIFF_OFFSET_SIZE as u64, 2)?;
            self.byte_order.write_sample_bits(writer, 0, 2)?;
            self.byte_order.write_sample_bits(writer, 0, 8)?;
        } else {
            self.byte_order.write_sample_bits(writer, header::TIFF_VERSION as u64, 2)?;
            self.byte_order.write_sample_bits(writer, 0, 4)?;
        }
        Ok(())
    }

    /// Write a file offset (4 bytes classic, 8 bytes BigTIFF)
    fn write_offset(&self, writer: &mut impl Write, offset: u64) -> TiffResult<()> {
        if self.big_tiff {
            self.byte_order.write_sample_bits(writer, offset, 8)?;
        } else {
            let offset = u32::try_from(offset).map_err(|_| TiffError::GenericError(
                format!("Offset {} does not fit a classic TIFF; use BigTIFF", offset)))?;
            self.byte_order.write_sample_bits(writer, offset as u64, 4)?;
        }
        Ok(())
    }

    /// Serialize one block, padding tiles past the image edge with zeros
    fn encode_block(&self, layout: &BlockLayout, plane: usize, bx: usize, by: usize) -> TiffResult<Vec<u8>> {
        let spb = layout.samples_per_block_pixel();
        let y0 = by * layout.block_height;
        let x0 = bx * layout.block_width;
        let rows = match self.blocks {
            BlockShape::Strips { .. } => layout.block_height.min(layout.image_height - y0),
            BlockShape::Tiles { .. } => layout.block_height,
        };

        let mut samples = Vec::with_capacity(rows * layout.block_row_len());
        for r in 0..rows {
            for c in 0..layout.block_width {
                let (y, x) = (y0 + r, x0 + c);
                for s in 0..spb {
                    let band = if layout.planar { plane } else { s };
                    let value = if y < layout.image_height && x < layout.image_width {
                        self.data[[band, y, x]]
                    } else {
                        0.0
                    };
                    samples.push(self.sample.from_f64(value));
                }
            }
        }

        if self.predictor {
            sample::apply_horizontal_predictor(&mut samples, layout.block_row_len(), spb, self.sample.mask());
        }

        let width = self.sample.bytes();
        let mut bytes = Vec::with_capacity(samples.len() * width);
        for bits in samples {
            self.byte_order.write_sample_bits(&mut bytes, bits, width)?;
        }
        Ok(bytes)
    }

    /// The tag entries of the image, sorted by tag
    fn entries(&self, layout: &BlockLayout, offsets: Vec<u64>, byte_counts: Vec<u64>) -> TiffResult<Vec<(u16, TagValue)>> {
        let spp = layout.samples_per_pixel;
        let to_long = |value: usize| u32::try_from(value).map_err(|_| TiffError::GenericError(
            format!("Value {} does not fit a LONG tag", value)));

        let offset_value = |values: Vec<u64>| -> TiffResult<TagValue> {
            if self.big_tiff {
                Ok(TagValue::Long8(values))
            } else {
                values.into_iter()
                    .map(|v| u32::try_from(v).map_err(|_| TiffError::GenericError(
                        format!("Offset {} does not fit a classic TIFF; use BigTIFF", v))))
                    .collect::<TiffResult<Vec<u32>>>()
                    .map(TagValue::Long)
            }
        };

        let mut entries = vec![
            (tags::IMAGE_WIDTH, TagValue::Long(vec![to_long(layout.image_width)?])),
            (tags::IMAGE_LENGTH, TagValue::Long(vec![to_long(layout.image_height)?])),
            (tags::BITS_PER_SAMPLE, TagValue::Short(vec![self.sample.bits; spp])),
            (tags::COMPRESSION, TagValue::Short(vec![self.compression])),
            (tags::PHOTOMETRIC_INTERPRETATION, TagValue::Short(vec![photometric::BLACK_IS_ZERO])),
            (tags::SAMPLES_PER_PIXEL, TagValue::Short(vec![u16::try_from(spp).map_err(|_| TiffError::GenericError(
                format!("{} bands exceed the TIFF limit", spp)))?])),
            (tags::PLANAR_CONFIGURATION, TagValue::Short(vec![
                if layout.planar { planar_config::PLANAR } else { planar_config::CHUNKY }])),
            (tags::SAMPLE_FORMAT, TagValue::Short(vec![self.sample.format_code(); spp])),
        ];

        match self.blocks {
            BlockShape::Strips { .. } => {
                entries.push((tags::STRIP_OFFSETS, offset_value(offsets)?));
                entries.push((tags::ROWS_PER_STRIP, TagValue::Long(vec![to_long(layout.block_height)?])));
                entries.push((tags::STRIP_BYTE_COUNTS, offset_value(byte_counts)?));
            }
            BlockShape::Tiles { .. } => {
                entries.push((tags::TILE_WIDTH, TagValue::Long(vec![to_long(layout.block_width)?])));
                entries.push((tags::TILE_LENGTH, TagValue::Long(vec![to_long(layout.block_height)?])));
                entries.push((tags::TILE_OFFSETS, offset_value(offsets)?));
                entries.push((tags::TILE_BYTE_COUNTS, offset_value(byte_counts)?));
            }
        }

        if self.predictor {
            entries.push((tags::PREDICTOR, TagValue::Short(vec![predictor::HORIZONTAL_DIFFERENCING])));
        }

        let t = &self.transform;
        let (raster_type, (origin_x, origin_y)) = if self.pixel_is_point {
            (geo_keys::PIXEL_IS_POINT, t.pixel_to_world(0.5, 0.5))
        } else {
            (geo_keys::PIXEL_IS_AREA, (t.origin_x, t.origin_y))
        };

        if self.model_transformation || t.row_rotation != 0.0 || t.col_rotation != 0.0 {
            entries.push((tags::MODEL_TRANSFORMATION_TAG, TagValue::Double(vec![
                t.pixel_width, t.row_rotation, 0.0, origin_x,
                t.col_rotation, t.pixel_height, 0.0, origin_y,
                0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ])));
        } else {
            entries.push((tags::MODEL_PIXEL_SCALE_TAG, TagValue::Double(vec![t.pixel_width, -t.pixel_height, 0.0])));
            entries.push((tags::MODEL_TIEPOINT_TAG, TagValue::Double(vec![0.0, 0.0, 0.0, origin_x, origin_y, 0.0])));
        }

        // Directory version 1.1.0 holding the single GTRasterTypeGeoKey
        entries.push((tags::GEO_KEY_DIRECTORY_TAG, TagValue::Short(vec![
            1, 1, 0, 1,
            geo_keys::RASTER_TYPE, 0, 1, raster_type,
        ])));

        entries.sort_by_key(|(tag, _)| *tag);
        Ok(entries)
    }

    /// Write out-of-line tag values followed by the IFD, returning the IFD offset
    fn write_ifd(&self, out: &mut Cursor<Vec<u8>>, entries: &[(u16, TagValue)]) -> TiffResult<u64> {
        let inline_size = if self.big_tiff { 8 } else { 4 };

        let mut fields = Vec::with_capacity(entries.len());
        for (_, value) in entries {
            let encoded = value.encode(self.byte_order)?;
            if encoded.len() <= inline_size {
                let mut field = encoded;
                field.resize(inline_size, 0);
                fields.push(field);
            } else {
                let offset = out.position();
                out.write_all(&encoded)?;
                write_utils::write_padding(out, encoded.len())?;

                let mut field = Vec::with_capacity(inline_size);
                self.write_offset(&mut field, offset)?;
                fields.push(field);
            }
        }

        let ifd_offset = write_utils::align_to_4_bytes(out.position());
        out.seek(SeekFrom::Start(ifd_offset))?;

        if self.big_tiff {
            self.byte_order.write_sample_bits(out, entries.len() as u64, 8)?;
        } else {
            self.byte_order.write_sample_bits(out, entries.len() as u64, 2)?;
        }

        for ((tag, value), field) in entries.iter().zip(fields) {
            self.byte_order.write_sample_bits(out, *tag as u64, 2)?;
            self.byte_order.write_sample_bits(out, value.field_type() as u64, 2)?;
            if self.big_tiff {
                self.byte_order.write_sample_bits(out, value.count(), 8)?;
            } else {
                self.byte_order.write_sample_bits(out, value.count(), 4)?;
            }
            out.write_all(&field)?;
        }

        // No next IFD
        self.write_offset(out, 0)?;

        Ok(ifd_offset)
    }
}
