//! Raster source abstraction
//!
//! Chip extraction only needs a handful of things from a tile: its size,
//! its band count, a way to turn a coordinate into a pixel and boundless
//! windowed reads. `RasterSource` captures exactly that so the extraction
//! logic can run against decoded GeoTIFFs and in-memory rasters alike.

use ndarray::Array3;

use crate::coordinate::Coordinate;
use crate::errors::ChipResult;

use super::transform::{GeoTransform, PixelIndex};
use super::window::Window;

/// A georeferenced multi-band raster that supports windowed reads
pub trait RasterSource {
    /// Width in pixels
    fn width(&self) -> usize;

    /// Height in pixels
    fn height(&self) -> usize;

    /// Total number of bands
    fn band_count(&self) -> usize;

    /// Pixel → world transform
    fn geo_transform(&self) -> &GeoTransform;

    /// Pixel containing a world coordinate (may lie outside the raster)
    fn index(&self, coordinate: &Coordinate) -> ChipResult<PixelIndex> {
        self.geo_transform().index(coordinate)
    }

    /// Read all bands over a window
    ///
    /// Returns an array of shape `(band_count, window.height, window.width)`.
    /// The window may extend past the raster edges; those cells are 0.
    fn read_window(&mut self, window: &Window) -> ChipResult<Array3<f64>>;
}
