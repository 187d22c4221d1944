//! Tile discovery
//!
//! Lists a raster directory and returns the validated paths of the
//! entries whose extension is allowed.

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ChipError, ChipResult};
use crate::utils::path_utils::{self, DEFAULT_MAX_PATHNAME_LENGTH};

/// Find the raster tiles in a directory
///
/// Every entry whose extension is in `allowed_extensions` is joined onto
/// `directory` and validated as a file. The first entry that fails
/// validation fails the whole call. Entries with other extensions are
/// ignored without being validated. Paths are limited to 140 characters.
/// Results are sorted by file name.
///
/// The directory itself is validated first, so a missing directory is a
/// `PathNotFound` error.
///
/// # Arguments
/// * `directory` - Directory to scan
/// * `allowed_extensions` - Extensions to keep, without the dot
///
/// # Returns
/// The validated tile paths, or the first validation or I/O error
pub fn discover_tiles(directory: &Path, allowed_extensions: &[&str]) -> ChipResult<Vec<PathBuf>> {
    discover_tiles_with_limit(directory, allowed_extensions, DEFAULT_MAX_PATHNAME_LENGTH)
}

/// `discover_tiles` with a custom maximum pathname length
pub fn discover_tiles_with_limit(directory: &Path, allowed_extensions: &[&str],
                                 max_pathname_length: usize) -> ChipResult<Vec<PathBuf>> {
    path_utils::validate_file_pathname(directory, false, &[], max_pathname_length)?;

    let mut names = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        names.push(entry.file_name());
    }
    names.sort();

    let mut tiles = Vec::new();
    for name in names {
        // Non UTF-8 names match on their lossy form and fail validation below
        if !allowed_extensions.contains(&path_utils::extension_of(&name.to_string_lossy())) {
            debug!("Skipping {:?}", name);
            continue;
        }

        let path = directory.join(&name);
        path_utils::validate_file_pathname(&path, true, allowed_extensions, max_pathname_length)
            .map_err(ChipError::Path)?;
        tiles.push(path);
    }

    info!("Discovered {} tiles in {}", tiles.len(), directory.display());
    Ok(tiles)
}
