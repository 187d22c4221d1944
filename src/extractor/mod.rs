//! Chip extraction
//!
//! Resolves coordinates to pixels in each tile, reads a square window of
//! all bands around them and splits each non-empty read into one chip per
//! period.

mod anchor;
mod config;
mod periods;
mod chip_map;
mod chip_extractor;

pub use anchor::{chip_window, window_size, WindowAnchor};
pub use config::{ExtractionConfig, DEFAULT_NUM_PERIODS, MAX_CHIP_SIZE};
pub use periods::{check_period_division, is_empty_read, split_periods, Chip};
pub use chip_map::{ChipMap, ChipSample};
pub use chip_extractor::{ChipExtractor, ExtractionStats};
