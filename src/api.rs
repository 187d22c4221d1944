use std::fmt;
use std::path::{Path, PathBuf};
use log::info;

use crate::coordinate::{self, Coordinate};
use crate::discovery;
use crate::errors::ChipResult;
use crate::extractor::{check_period_division, ChipExtractor, ChipMap, ExtractionConfig, ExtractionStats};
use crate::raster::{GeoTiffRaster, RasterInfo};
use crate::utils::path_utils;

/// Structure of one discovered tile
#[derive(Debug, Clone, PartialEq)]
pub struct TileReport {
    /// Path of the tile
    pub path: PathBuf,
    /// Decoded structure and georeference
    pub info: RasterInfo,
    /// Whether the band count splits evenly into the configured periods
    pub periods_divide: bool,
}

impl fmt::Display for TileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.path.display())?;
        writeln!(f, "{}", self.info)?;
        write!(f, "  Periods: {}", if self.periods_divide { "bands divide evenly" } else { "uneven band split" })
    }
}

/// Main interface to the ChipKit library
pub struct ChipKit {
    config: ExtractionConfig,
}

impl ChipKit {
    /// Create a new ChipKit instance
    ///
    /// # Arguments
    /// * `config` - Extraction settings, validated here
    ///
    /// # Returns
    /// A ChipKit instance or an error if the settings are invalid
    pub fn new(config: ExtractionConfig) -> ChipResult<Self> {
        config.validate()?;
        Ok(ChipKit { config })
    }

    /// Create a ChipKit instance from a TOML configuration file
    pub fn from_config_file(path: &Path) -> ChipResult<Self> {
        Self::new(ExtractionConfig::from_toml_file(path)?)
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// List the usable raster tiles in a directory
    ///
    /// # Arguments
    /// * `raster_dir` - Relative path of the tile directory
    ///
    /// # Returns
    /// Validated tile paths sorted by file name
    pub fn discover(&self, raster_dir: &Path) -> ChipResult<Vec<PathBuf>> {
        discovery::discover_tiles_with_limit(raster_dir, &self.config.extension_refs(),
                                             self.config.max_pathname_length)
    }

    /// Load and validate a coordinates document
    pub fn load_coordinates(&self, coordinates_file: &Path) -> ChipResult<Vec<Coordinate>> {
        path_utils::validate_file_pathname(coordinates_file, true, &[], self.config.max_pathname_length)?;
        coordinate::load_coordinates(coordinates_file)
    }

    /// Run discovery and chip extraction end to end
    ///
    /// # Arguments
    /// * `coordinates_file` - Relative path of the coordinates document
    /// * `raster_dir` - Relative path of the tile directory
    /// * `show_progress` - Whether to draw a progress bar over the tiles
    ///
    /// # Returns
    /// The chips per coordinate and the run counters
    pub fn extract(&self,
                   coordinates_file: &Path,
                   raster_dir: &Path,
                   show_progress: bool) -> ChipResult<(ChipMap, ExtractionStats)> {
        info!("Extracting {}x{} chips in {} periods for {} from {}",
              self.config.window_size(), self.config.window_size(), self.config.num_periods,
              coordinates_file.display(), raster_dir.display());

        ChipExtractor::new(self.config.clone())?
            .with_progress(show_progress)
            .extract_from_directory(coordinates_file, raster_dir)
    }

    /// Extract chips for in-memory coordinates from already discovered tiles
    pub fn extract_chips(&self, coordinates: &[Coordinate], tiles: &[PathBuf]) -> ChipResult<ChipMap> {
        ChipExtractor::new(self.config.clone())?.extract_chips(coordinates, tiles)
    }

    /// Describe a single GeoTIFF tile
    pub fn analyze(&self, tile: &Path) -> ChipResult<TileReport> {
        let raster = GeoTiffRaster::open(tile)?;
        let info = raster.info().clone();
        let periods_divide = check_period_division(info.band_count, self.config.num_periods).is_ok();

        Ok(TileReport { path: tile.to_path_buf(), info, periods_divide })
    }

    /// Describe every tile discovery finds in a directory
    ///
    /// # Arguments
    /// * `raster_dir` - Relative path of the tile directory
    ///
    /// # Returns
    /// One report per tile, in discovery order
    pub fn inspect(&self, raster_dir: &Path) -> ChipResult<Vec<TileReport>> {
        let tiles = self.discover(raster_dir)?;
        info!("Inspecting {} tiles in {}", tiles.len(), raster_dir.display());

        tiles.iter().map(|tile| self.analyze(tile)).collect()
    }
}
