//! GeoTIFF-backed raster source
//!
//! Opens a tile once, parses its first full-resolution IFD and georeference
//! and keeps the file handle for windowed reads.

use log::debug;
use ndarray::Array3;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::{ChipError, ChipResult};
use crate::tiff::constants::{geo_keys, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

use super::block_reader::BlockReader;
use super::source::RasterSource;
use super::transform::GeoTransform;
use super::window::Window;

/// Summary of a tile's structure, for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub bits_per_sample: u16,
    pub sample_kind: String,
    pub tiled: bool,
    pub planar: bool,
    pub block_width: usize,
    pub block_height: usize,
    pub compression: String,
    pub big_tiff: bool,
    pub byte_order: String,
    pub transform: GeoTransform,
}

impl fmt::Display for RasterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Size: {} x {} pixels, {} bands", self.width, self.height, self.band_count)?;
        writeln!(f, "  Samples: {}-bit {}", self.bits_per_sample, self.sample_kind)?;
        writeln!(f, "  Layout: {} {}x{}, {}",
                 if self.tiled { "tiles" } else { "strips" },
                 self.block_width, self.block_height,
                 if self.planar { "planar" } else { "interleaved" })?;
        writeln!(f, "  Compression: {}", self.compression)?;
        writeln!(f, "  Format: {} ({})", if self.big_tiff { "BigTIFF" } else { "TIFF" }, self.byte_order)?;
        write!(f, "  Geotransform: {}", self.transform)
    }
}

/// A raster source reading from a GeoTIFF file
pub struct GeoTiffRaster {
    path: PathBuf,
    reader: BufReader<File>,
    blocks: BlockReader,
    transform: GeoTransform,
    info: RasterInfo,
}

impl GeoTiffRaster {
    /// Open a GeoTIFF tile
    ///
    /// # Arguments
    /// * `path` - Path of the tile
    ///
    /// # Returns
    /// The opened raster, or a `ChipError::Tiff` naming the tile
    pub fn open(path: &Path) -> ChipResult<Self> {
        Self::open_inner(path).map_err(|e| ChipError::tiff(path, e))
    }

    fn open_inner(path: &Path) -> TiffResult<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(64 * 1024, file);

        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.read(&mut reader)?;
        let ifd = tiff.main_ifd()
            .ok_or_else(|| TiffError::GenericError("No image in TIFF file".to_string()))?;

        let blocks = BlockReader::from_ifd(&mut reader, &tiff_reader, ifd, tiff.byte_order)?;
        let transform = read_geo_transform(&mut reader, &tiff_reader, ifd)?;

        let layout = *blocks.layout();
        let sample = *blocks.sample_layout();
        let info = RasterInfo {
            width: layout.image_width,
            height: layout.image_height,
            band_count: layout.samples_per_pixel,
            bits_per_sample: sample.bits,
            sample_kind: format!("{:?}", sample.kind).to_lowercase(),
            tiled: ifd.is_tiled(),
            planar: layout.planar,
            block_width: layout.block_width,
            block_height: layout.block_height,
            compression: blocks.compression_name().to_string(),
            big_tiff: tiff.is_big_tiff,
            byte_order: tiff.byte_order.name().to_string(),
            transform,
        };

        debug!("Opened {}: {}x{} pixels, {} bands", path.display(), info.width, info.height, info.band_count);

        Ok(GeoTiffRaster {
            path: path.to_path_buf(),
            reader,
            blocks,
            transform,
            info,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &RasterInfo {
        &self.info
    }
}

/// Read the georeference of an IFD
///
/// ModelTransformation takes precedence over tiepoint + pixel scale. For
/// PixelIsPoint tiles the origin is moved to the corner of the first pixel.
fn read_geo_transform(reader: &mut BufReader<File>, tiff_reader: &TiffReader, ifd: &IFD) -> TiffResult<GeoTransform> {
    let transform = if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
        let matrix = tiff_reader.read_tag_f64_values(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
        GeoTransform::from_model_transformation(&matrix)?
    } else if ifd.has_tag(tags::MODEL_TIEPOINT_TAG) && ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) {
        let tiepoint = tiff_reader.read_tag_f64_values(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
        let scale = tiff_reader.read_tag_f64_values(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
        GeoTransform::from_tiepoint_and_scale(&tiepoint, &scale)?
    } else {
        return Err(TiffError::MissingGeoreference);
    };

    let key_directory = tiff_reader.read_optional_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
    match key_directory.as_deref().and_then(raster_type) {
        Some(raster_type) if raster_type == geo_keys::PIXEL_IS_POINT as u64 => {
            debug!("PixelIsPoint raster, shifting origin by half a pixel");
            Ok(transform.point_to_area())
        }
        _ => Ok(transform),
    }
}

/// Find GTRasterTypeGeoKey in a GeoKeyDirectory
///
/// The directory is a header of four SHORTs (version, revision, minor
/// revision, key count) followed by four SHORTs per key: id, tag location,
/// count and value. Only keys stored inline (location 0) are considered.
fn raster_type(directory: &[u64]) -> Option<u64> {
    let key_count = *directory.get(3)? as usize;
    directory[4..].chunks_exact(4)
        .take(key_count)
        .find(|key| key[0] == geo_keys::RASTER_TYPE as u64 && key[1] == 0)
        .map(|key| key[3])
}

impl RasterSource for GeoTiffRaster {
    fn width(&self) -> usize {
        self.info.width
    }

    fn height(&self) -> usize {
        self.info.height
    }

    fn band_count(&self) -> usize {
        self.info.band_count
    }

    fn geo_transform(&self) -> &GeoTransform {
        &self.transform
    }

    fn read_window(&mut self, window: &Window) -> ChipResult<Array3<f64>> {
        self.blocks.read_window(&mut self.reader, window)
            .map_err(|e| ChipError::tiff(&self.path, e))
    }
}
