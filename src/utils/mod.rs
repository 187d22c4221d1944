//! Utility modules for common functionality
//!
//! This module provides various utility functions and types used throughout the application.

pub mod logger;
pub mod path_utils;
pub(crate) mod progress;
pub(crate) mod write_utils;
pub(crate) mod tag_utils;
#[cfg(test)]
pub(crate) mod test_utils;
