//! Chip extraction over tiles and coordinates
//!
//! Tiles form the outer loop and coordinates the inner one. Each tile is
//! opened once and dropped before the next is opened, on success and on
//! error alike. A coordinate whose window reads as empty in a tile is
//! skipped for that tile; a later tile producing chips for a coordinate
//! replaces what an earlier tile produced.

use log::{debug, info, warn};
use std::fmt;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use crate::coordinate::{self, Coordinate};
use crate::discovery;
use crate::errors::ChipResult;
use crate::raster::{GeoTiffRaster, RasterSource};
use crate::utils::path_utils;
use crate::utils::progress::ProgressTracker;

use super::anchor::chip_window;
use super::chip_map::{ChipMap, ChipSample};
use super::config::ExtractionConfig;
use super::periods::{check_period_division, is_empty_read, split_periods};

/// Counters describing an extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Tiles processed
    pub tiles: usize,
    /// Coordinate lookups performed (tiles × coordinates)
    pub lookups: usize,
    /// Windows that produced chips
    pub hits: usize,
    /// Windows skipped because they held no data
    pub empty_windows: usize,
    /// Hits that replaced chips from an earlier tile
    pub overwrites: usize,
}

impl AddAssign for ExtractionStats {
    fn add_assign(&mut self, other: Self) {
        self.tiles += other.tiles;
        self.lookups += other.lookups;
        self.hits += other.hits;
        self.empty_windows += other.empty_windows;
        self.overwrites += other.overwrites;
    }
}

impl fmt::Display for ExtractionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tiles, {} lookups, {} chips extracted, {} empty windows, {} overwritten",
               self.tiles, self.lookups, self.hits, self.empty_windows, self.overwrites)
    }
}

/// Extracts per-period chips around coordinates from raster tiles
pub struct ChipExtractor {
    config: ExtractionConfig,
    show_progress: bool,
}

impl ChipExtractor {
    /// Create an extractor, rejecting invalid settings
    pub fn new(config: ExtractionConfig) -> ChipResult<Self> {
        config.validate()?;
        Ok(ChipExtractor { config, show_progress: false })
    }

    /// Draw a progress bar over the tiles while extracting
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Discover tiles, load coordinates and extract chips
    ///
    /// # Arguments
    /// * `coordinates_file` - Relative path of the coordinates document
    /// * `raster_dir` - Relative path of the tile directory
    ///
    /// # Returns
    /// The chips per coordinate and the run counters
    pub fn extract_from_directory(&self, coordinates_file: &Path,
                                  raster_dir: &Path) -> ChipResult<(ChipMap, ExtractionStats)> {
        let extensions = self.config.extension_refs();
        let tiles = discovery::discover_tiles_with_limit(raster_dir, &extensions, self.config.max_pathname_length)?;

        path_utils::validate_file_pathname(coordinates_file, true, &[], self.config.max_pathname_length)?;
        let coordinates = coordinate::load_coordinates(coordinates_file)?;

        self.extract_with_stats(&coordinates, &tiles)
    }

    /// Extract chips for every coordinate from every tile
    ///
    /// Any tile or read error aborts the run; no partial mapping is returned.
    pub fn extract_chips(&self, coordinates: &[Coordinate], tiles: &[PathBuf]) -> ChipResult<ChipMap> {
        self.extract_with_stats(coordinates, tiles).map(|(chips, _)| chips)
    }

    /// `extract_chips`, also returning the run counters
    pub fn extract_with_stats(&self, coordinates: &[Coordinate],
                              tiles: &[PathBuf]) -> ChipResult<(ChipMap, ExtractionStats)> {
        let progress = if self.show_progress {
            ProgressTracker::new(tiles.len() as u64, "Extracting chips")
        } else {
            ProgressTracker::hidden()
        };

        let mut chips = ChipMap::new();
        let mut stats = ExtractionStats::default();

        for tile in tiles {
            let name = tile.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            progress.set_message(&name);

            let mut raster = GeoTiffRaster::open(tile)?;
            info!("Processing tile {} ({}x{} pixels, {} bands)",
                  tile.display(), raster.width(), raster.height(), raster.band_count());

            stats += self.extract_from_raster(&mut raster, tile, coordinates, &mut chips)?;
            progress.increment(1);
        }

        progress.finish();
        info!("Extraction finished: {}; {} coordinates with chips", stats, chips.len());
        Ok((chips, stats))
    }

    /// Extract chips for every coordinate from one opened raster
    ///
    /// # Arguments
    /// * `raster` - The raster to read
    /// * `source` - Label recorded as the chips' origin
    /// * `coordinates` - Coordinates to look up
    /// * `chips` - Mapping the chips are stored in
    ///
    /// # Returns
    /// Counters for this raster
    pub fn extract_from_raster<R: RasterSource + ?Sized>(
        &self,
        raster: &mut R,
        source: &Path,
        coordinates: &[Coordinate],
        chips: &mut ChipMap,
    ) -> ChipResult<ExtractionStats> {
        check_period_division(raster.band_count(), self.config.num_periods)?;

        let mut stats = ExtractionStats { tiles: 1, ..Default::default() };
        for coordinate in coordinates {
            stats.lookups += 1;

            let pixel = raster.index(coordinate)?;
            let window = chip_window(pixel, self.config.chip_size, self.config.anchor);
            let read = raster.read_window(&window)?;

            if is_empty_read(&read) {
                debug!("No data for {} in {} (window {:?})", coordinate, source.display(), window);
                stats.empty_windows += 1;
                continue;
            }

            let periods = split_periods(&read, self.config.num_periods)?;
            debug!("Extracted {} periods for {} from {} at row {}, col {}",
                   periods.len(), coordinate, source.display(), pixel.row, pixel.col);

            if let Some(previous) = chips.insert(*coordinate, ChipSample::new(source, periods)) {
                warn!("Chips for {} from {} replaced by {}",
                      coordinate, previous.source().display(), source.display());
                stats.overwrites += 1;
            }
            stats.hits += 1;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChipError;
    use crate::extractor::WindowAnchor;
    use crate::raster::{GeoTransform, MemoryRaster};
    use ndarray::Array3;

    // 10x10 raster with 1-unit pixels, upper-left corner at (0, 10)
    fn raster(bands: usize, value: impl Fn(usize, usize, usize) -> f64) -> MemoryRaster {
        let data = Array3::from_shape_fn((bands, 10, 10), |(b, r, c)| value(b, r, c));
        MemoryRaster::new(data, GeoTransform::north_up(0.0, 10.0, 1.0, 1.0)).unwrap()
    }

    fn extractor(chip_size: usize, num_periods: usize, anchor: WindowAnchor) -> ChipExtractor {
        ChipExtractor::new(ExtractionConfig {
            chip_size,
            num_periods,
            anchor,
            ..Default::default()
        }).unwrap()
    }

    #[test]
    fn corner_anchored_window_starts_at_coordinate_pixel() {
        let mut raster = raster(2, |b, r, c| (b * 1000 + r * 10 + c) as f64 + 1.0);
        let coordinate = Coordinate::new(3.5, 6.5); // row 3, col 3
        let mut chips = ChipMap::new();

        let stats = extractor(1, 2, WindowAnchor::Corner)
            .extract_from_raster(&mut raster, Path::new("tile.tif"), &[coordinate], &mut chips)
            .unwrap();

        assert_eq!(stats.hits, 1);
        let sample = chips.get(&coordinate).unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample.periods[0].dim(), (1, 3, 3));
        assert_eq!(sample.periods[0][[0, 0, 0]], 34.0);
        assert_eq!(sample.periods[1][[0, 2, 2]], 1056.0);
    }

    #[test]
    fn center_anchored_window_surrounds_pixel() {
        let mut raster = raster(1, |_, r, c| (r * 10 + c) as f64 + 1.0);
        let coordinate = Coordinate::new(3.5, 6.5);
        let mut chips = ChipMap::new();

        extractor(1, 1, WindowAnchor::Center)
            .extract_from_raster(&mut raster, Path::new("tile.tif"), &[coordinate], &mut chips)
            .unwrap();

        let chip = &chips.get(&coordinate).unwrap().periods[0];
        assert_eq!(chip[[0, 1, 1]], 34.0);
        assert_eq!(chip[[0, 0, 0]], 23.0);
    }

    #[test]
    fn empty_windows_are_skipped_without_error() {
        let mut raster = raster(2, |b, r, _| if b == 1 || r < 5 { 7.0 } else { 0.0 });
        let inside = Coordinate::new(1.5, 8.5);   // row 1
        let empty = Coordinate::new(1.5, 2.5);    // row 7, first band is zero there
        let outside = Coordinate::new(50.0, 50.0);
        let mut chips = ChipMap::new();

        let stats = extractor(1, 1, WindowAnchor::Corner)
            .extract_from_raster(&mut raster, Path::new("tile.tif"), &[inside, empty, outside], &mut chips)
            .unwrap();

        assert_eq!(chips.len(), 1);
        assert!(chips.contains(&inside));
        assert_eq!(stats.empty_windows, 2);
        assert_eq!(stats.lookups, 3);
    }

    #[test]
    fn window_hanging_off_the_edge_is_zero_padded() {
        let mut raster = raster(1, |_, _, _| 1.0);
        let coordinate = Coordinate::new(8.5, 1.5); // row 8, col 8
        let mut chips = ChipMap::new();

        extractor(2, 1, WindowAnchor::Corner)
            .extract_from_raster(&mut raster, Path::new("tile.tif"), &[coordinate], &mut chips)
            .unwrap();

        let chip = &chips.get(&coordinate).unwrap().periods[0];
        assert_eq!(chip.dim(), (1, 5, 5));
        assert_eq!(chip[[0, 1, 1]], 1.0);
        assert_eq!(chip[[0, 2, 2]], 0.0);
        assert_eq!(chip[[0, 4, 0]], 0.0);
    }

    #[test]
    fn later_raster_overwrites_earlier() {
        let mut first = raster(1, |_, _, _| 1.0);
        let mut second = raster(1, |_, _, _| 2.0);
        let coordinate = Coordinate::new(2.5, 2.5);
        let extractor = extractor(0, 1, WindowAnchor::Corner);
        let mut chips = ChipMap::new();

        extractor.extract_from_raster(&mut first, Path::new("a.tif"), &[coordinate], &mut chips).unwrap();
        let stats = extractor.extract_from_raster(&mut second, Path::new("b.tif"), &[coordinate], &mut chips).unwrap();

        assert_eq!(stats.overwrites, 1);
        let sample = chips.get(&coordinate).unwrap();
        assert_eq!(sample.source(), Path::new("b.tif"));
        assert_eq!(sample.periods[0][[0, 0, 0]], 2.0);
    }

    #[test]
    fn uneven_band_division_is_rejected_before_reading() {
        let mut raster = raster(5, |_, _, _| 1.0);
        let mut chips = ChipMap::new();

        let err = extractor(0, 2, WindowAnchor::Corner)
            .extract_from_raster(&mut raster, Path::new("tile.tif"), &[], &mut chips)
            .unwrap_err();
        assert!(matches!(err, ChipError::Config(_)));
    }

    #[test]
    fn missing_tile_aborts_the_run() {
        let extractor = extractor(0, 1, WindowAnchor::Corner);
        let result = extractor.extract_chips(&[Coordinate::new(0.0, 0.0)], &[PathBuf::from("missing.tif")]);
        assert!(matches!(result, Err(ChipError::Tiff { .. })));
    }

    #[test]
    fn stats_accumulate() {
        let mut total = ExtractionStats::default();
        total += ExtractionStats { tiles: 1, lookups: 2, hits: 1, empty_windows: 1, overwrites: 0 };
        total += ExtractionStats { tiles: 1, lookups: 2, hits: 2, empty_windows: 0, overwrites: 1 };
        assert_eq!(total, ExtractionStats { tiles: 2, lookups: 4, hits: 3, empty_windows: 1, overwrites: 1 });
    }
}
