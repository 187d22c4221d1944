pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod errors;
pub mod raster;
pub mod coordinate;
pub mod discovery;
pub mod extractor;
pub mod commands;
pub mod api;

pub use crate::api::{ChipKit, TileReport};

pub use errors::{ChipError, ChipResult, PathError, PathErrorKind};
pub use coordinate::{load_coordinates, Coordinate};
pub use discovery::discover_tiles;
pub use extractor::{ChipExtractor, ChipMap, ChipSample, ExtractionConfig, ExtractionStats, WindowAnchor};
pub use raster::{GeoTiffRaster, GeoTransform, MemoryRaster, RasterSource, Window};
pub use tiff::{BlockShape, GeoTiffBuilder};
