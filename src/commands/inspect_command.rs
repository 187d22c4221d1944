//! Tile inspection command
//!
//! Runs discovery on a directory and reports the structure of every tile
//! it finds, including whether its bands split evenly into periods.

use clap::ArgMatches;
use log::{info, warn};
use std::path::PathBuf;

use crate::api::ChipKit;
use crate::commands::command_traits::Command;
use crate::errors::{ChipError, ChipResult};
use crate::extractor::ExtractionConfig;

/// Command for describing the tiles of a directory
pub struct InspectCommand {
    /// Directory holding the raster tiles
    raster_dir: PathBuf,
    /// Settings used for discovery and the period check
    config: ExtractionConfig,
}

impl InspectCommand {
    /// Create a new inspect command
    ///
    /// # Arguments
    /// * `args` - Matches of the `inspect` subcommand
    ///
    /// # Returns
    /// A new InspectCommand instance or an error
    pub fn new(args: &ArgMatches) -> ChipResult<Self> {
        let raster_dir = args.get_one::<String>("raster-dir")
            .map(PathBuf::from)
            .ok_or_else(|| ChipError::Config("Missing raster directory".to_string()))?;

        let mut config = ExtractionConfig::default();
        if let Some(periods) = args.get_one::<usize>("periods") {
            config.num_periods = *periods;
        }
        config.validate()?;

        Ok(InspectCommand { raster_dir, config })
    }
}

impl Command for InspectCommand {
    fn execute(&self) -> ChipResult<()> {
        let kit = ChipKit::new(self.config.clone())?;
        let reports = kit.inspect(&self.raster_dir)?;
        info!("Inspected {} tiles", reports.len());

        println!("{} tiles in {} ({} periods):", reports.len(), self.raster_dir.display(), self.config.num_periods);
        for report in &reports {
            if !report.periods_divide {
                warn!("{} has {} bands, not divisible into {} periods",
                      report.path.display(), report.info.band_count, self.config.num_periods);
            }
            println!("{}", report);
        }
        Ok(())
    }
}
