//! CLI command implementations
//!
//! This module contains implementations of the commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod extract_command;
pub mod inspect_command;

pub use command_traits::{Command, CommandFactory};
pub use extract_command::ExtractCommand;
pub use inspect_command::InspectCommand;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command as ClapCommand};
use crate::errors::{ChipError, ChipResult};

/// Build the command-line interface
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("chipkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract per-period chips around coordinates from multi-band GeoTIFF tiles")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also write log records to this file")
                .value_name("FILE")
                .global(true),
        )
        .subcommand(
            ClapCommand::new("extract")
                .about("Extract chips for every coordinate from every tile")
                .arg(
                    Arg::new("coordinates")
                        .help("JSON document with a \"coordinates\" array of [x, y] pairs")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("raster-dir")
                        .help("Directory holding the raster tiles")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("chip-size")
                        .long("chip-size")
                        .help("Padding around the pixel; windows are 2 * N + 1 pixels wide")
                        .value_name("N")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("periods")
                        .long("periods")
                        .help("Number of periods the bands are split into")
                        .value_name("N")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("anchor")
                        .long("anchor")
                        .help("Place the pixel at the window's corner or center")
                        .value_name("ANCHOR")
                        .value_parser(["corner", "center", "centre"]),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("TOML file with extraction settings")
                        .value_name("FILE"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Write each chip as <DIR>/<x>_<y>/period_<k>.npy")
                        .value_name("DIR"),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help("Hide the progress bar")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            ClapCommand::new("inspect")
                .about("Describe the tiles found in a directory")
                .arg(
                    Arg::new("raster-dir")
                        .help("Directory holding the raster tiles")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("periods")
                        .long("periods")
                        .help("Period count to check band counts against")
                        .value_name("N")
                        .value_parser(value_parser!(usize)),
                ),
        )
}

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the selected subcommand and creates
/// the appropriate command instance for execution.
pub struct ChipkitCommandFactory;

impl ChipkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        ChipkitCommandFactory
    }
}

impl Default for ChipkitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for ChipkitCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> ChipResult<Box<dyn Command>> {
        match args.subcommand() {
            Some(("extract", sub_args)) => Ok(Box::new(ExtractCommand::new(sub_args)?)),
            Some(("inspect", sub_args)) => Ok(Box::new(InspectCommand::new(sub_args)?)),
            Some((name, _)) => Err(ChipError::Config(format!("Unknown command: {}", name))),
            None => Err(ChipError::Config("No command given".to_string())),
        }
    }
}
