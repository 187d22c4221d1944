//! Extraction settings
//!
//! Settings can be read from a TOML file; any key left out takes its
//! default:
//!
//! ```toml
//! chip_size = 5
//! num_periods = 37
//! anchor = "corner"
//! extensions = ["tif"]
//! max_pathname_length = 140
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{ChipError, ChipResult};
use crate::utils::path_utils::DEFAULT_MAX_PATHNAME_LENGTH;

use super::anchor::WindowAnchor;

/// Number of periods in the reference tile stacks (one per year)
pub const DEFAULT_NUM_PERIODS: usize = 37;

/// Largest chip size accepted; keeps window arithmetic far from overflow
pub const MAX_CHIP_SIZE: usize = 1 << 20;

/// Settings of a chip extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Padding around the coordinate's pixel; the window side is `2 * chip_size + 1`
    pub chip_size: usize,
    /// Number of equal band groups each read is split into
    pub num_periods: usize,
    /// Placement of the pixel inside the window
    pub anchor: WindowAnchor,
    /// Tile extensions picked up by discovery, without the dot
    pub extensions: Vec<String>,
    /// Maximum pathname length for input files
    pub max_pathname_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            chip_size: 0,
            num_periods: DEFAULT_NUM_PERIODS,
            anchor: WindowAnchor::Corner,
            extensions: vec!["tif".to_string()],
            max_pathname_length: DEFAULT_MAX_PATHNAME_LENGTH,
        }
    }
}

impl ExtractionConfig {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> ChipResult<Self> {
        let config: ExtractionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read settings from a TOML file
    pub fn from_toml_file(path: &Path) -> ChipResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> ChipResult<()> {
        if self.num_periods == 0 {
            return Err(ChipError::Config("number of periods must be at least 1".to_string()));
        }
        if self.chip_size > MAX_CHIP_SIZE {
            return Err(ChipError::Config(format!(
                "chip size {} exceeds the maximum of {}", self.chip_size, MAX_CHIP_SIZE)));
        }
        if self.extensions.iter().any(|ext| ext.is_empty() || ext.starts_with('.')) {
            return Err(ChipError::Config(format!(
                "extensions must be given without a dot: {:?}", self.extensions)));
        }
        if self.max_pathname_length == 0 {
            return Err(ChipError::Config("maximum pathname length must be positive".to_string()));
        }
        Ok(())
    }

    /// Side length of the chip window
    pub fn window_size(&self) -> usize {
        super::anchor::window_size(self.chip_size)
    }

    /// Extensions as string slices, for discovery
    pub fn extension_refs(&self) -> Vec<&str> {
        self.extensions.iter().map(String::as_str).collect()
    }
}
