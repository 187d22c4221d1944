//! Chip extraction command
//!
//! Discovers the tiles in a directory, extracts chips around the
//! coordinates of a coordinates document and prints a summary. Chips can
//! also be written out as NPY files.

use clap::ArgMatches;
use log::info;
use std::path::{Path, PathBuf};

use crate::api::ChipKit;
use crate::commands::command_traits::Command;
use crate::errors::{ChipError, ChipResult};
use crate::extractor::{ChipMap, ExtractionConfig, WindowAnchor};

/// Command for extracting chips around coordinates
pub struct ExtractCommand {
    /// Path to the coordinates document
    coordinates_file: PathBuf,
    /// Directory holding the raster tiles
    raster_dir: PathBuf,
    /// Directory the chips are written to, if any
    output_dir: Option<PathBuf>,
    /// Resolved extraction settings
    config: ExtractionConfig,
    /// Whether to draw a progress bar
    show_progress: bool,
}

impl ExtractCommand {
    /// Create a new extract command
    ///
    /// # Arguments
    /// * `args` - Matches of the `extract` subcommand
    ///
    /// # Returns
    /// A new ExtractCommand instance or an error
    pub fn new(args: &ArgMatches) -> ChipResult<Self> {
        let coordinates_file = args.get_one::<String>("coordinates")
            .map(PathBuf::from)
            .ok_or_else(|| ChipError::Config("Missing coordinates file".to_string()))?;
        let raster_dir = args.get_one::<String>("raster-dir")
            .map(PathBuf::from)
            .ok_or_else(|| ChipError::Config("Missing raster directory".to_string()))?;
        info!("Coordinates: {}, tiles: {}", coordinates_file.display(), raster_dir.display());

        let config = resolve_config(args)?;
        info!("Chip size: {}, periods: {}, anchor: {}", config.chip_size, config.num_periods, config.anchor);

        let output_dir = args.get_one::<String>("output").map(PathBuf::from);
        let show_progress = !args.get_flag("quiet");

        Ok(ExtractCommand {
            coordinates_file,
            raster_dir,
            output_dir,
            config,
            show_progress,
        })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn print_summary(&self, chips: &ChipMap) {
        println!("Chips for {} coordinates:", chips.len());
        for (coordinate, sample) in chips {
            let shape = sample.periods.first().map(|chip| chip.dim());
            match shape {
                Some((bands, rows, cols)) => println!("  {}: {} periods of {}x{}x{} from {}",
                                                      coordinate, sample.len(), bands, rows, cols,
                                                      sample.source().display()),
                None => println!("  {}: no periods from {}", coordinate, sample.source().display()),
            }
        }
    }

    fn save_chips(&self, chips: &ChipMap, output_dir: &Path) -> ChipResult<()> {
        let written = chips.save_npy(output_dir)?;
        info!("Wrote {} chip files to {}", written, output_dir.display());
        println!("Wrote {} chip files to {}", written, output_dir.display());
        Ok(())
    }
}

impl Command for ExtractCommand {
    fn execute(&self) -> ChipResult<()> {
        let kit = ChipKit::new(self.config.clone())?;
        let (chips, stats) = kit.extract(&self.coordinates_file, &self.raster_dir, self.show_progress)?;

        self.print_summary(&chips);
        println!("{}", stats);

        if let Some(output_dir) = &self.output_dir {
            self.save_chips(&chips, output_dir)?;
        }
        Ok(())
    }
}

/// Layer settings: defaults, then the `--config` file, then explicit flags
pub fn resolve_config(args: &ArgMatches) -> ChipResult<ExtractionConfig> {
    let mut config = match args.get_one::<String>("config") {
        Some(path) => {
            info!("Loading configuration from {}", path);
            ExtractionConfig::from_toml_file(Path::new(path))?
        }
        None => ExtractionConfig::default(),
    };

    if let Some(chip_size) = args.get_one::<usize>("chip-size") {
        config.chip_size = *chip_size;
    }
    if let Some(periods) = args.get_one::<usize>("periods") {
        config.num_periods = *periods;
    }
    if let Some(anchor) = args.get_one::<String>("anchor") {
        config.anchor = anchor.parse::<WindowAnchor>().map_err(ChipError::Config)?;
    }

    config.validate()?;
    Ok(config)
}
