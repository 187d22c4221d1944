//! Raster access for chip extraction
//!
//! Georeferencing, windows and the `RasterSource` trait, with a GeoTIFF
//! implementation and an in-memory one.

pub mod window;
pub mod transform;
pub mod source;
pub mod sample;
pub mod block_reader;
pub mod geotiff;
pub mod memory;

pub use geotiff::{GeoTiffRaster, RasterInfo};
pub use memory::MemoryRaster;
pub use source::RasterSource;
pub use transform::{GeoTransform, PixelIndex};
pub use window::Window;
