//! Path validation utilities
//!
//! Pre-flight checks applied to every tile path and input file before it
//! is opened. Checks run in a fixed order and the first failure wins.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

use crate::errors::PathError;

/// Default maximum number of characters in a pathname
pub const DEFAULT_MAX_PATHNAME_LENGTH: usize = 140;

lazy_static! {
    static ref BANNED_CHARACTERS: Regex = Regex::new(r"[@ !#$%^&*()<>?|}{~:]")
        .unwrap_or_else(|e| panic!("invalid banned character pattern: {}", e));
}

/// Extension of a pathname: the text after its last `.`
///
/// A name without a dot is its own extension, so it never matches a
/// typical extension list.
pub fn extension_of(pathname: &str) -> &str {
    pathname.rsplit_once('.').map(|(_, ext)| ext).unwrap_or(pathname)
}

/// Validate a file or directory pathname
///
/// Checks, in order: the path is relative, it is at most
/// `max_pathname_length` characters, it has none of the banned characters
/// `@ !#$%^&*()<>?|}{~:` (space included), its extension is allowed (files
/// only, and only when `allowed_extensions` is non-empty), it exists, and
/// it is not a directory when a file is required.
///
/// # Arguments
/// * `pathname` - The path to check
/// * `is_file` - Whether the path must name a file
/// * `allowed_extensions` - Allowed extensions without the dot; empty allows any
/// * `max_pathname_length` - Maximum number of characters
pub fn validate_file_pathname(
    pathname: &Path,
    is_file: bool,
    allowed_extensions: &[&str],
    max_pathname_length: usize,
) -> Result<(), PathError> {
    let text = pathname.to_str()
        .ok_or_else(|| PathError::NotUtf8(pathname.to_path_buf()))?;

    if pathname.is_absolute() {
        return Err(PathError::AbsolutePath(text.to_string()));
    }

    if text.chars().count() > max_pathname_length {
        return Err(PathError::TooLong { path: text.to_string(), max_length: max_pathname_length });
    }

    if let Some(found) = BANNED_CHARACTERS.find(text) {
        let character = found.as_str().chars().next().unwrap_or(' ');
        return Err(PathError::BannedCharacter { path: text.to_string(), character });
    }

    if is_file && !allowed_extensions.is_empty() && !allowed_extensions.contains(&extension_of(text)) {
        return Err(PathError::DisallowedExtension {
            path: text.to_string(),
            allowed: allowed_extensions.iter().map(|ext| ext.to_string()).collect(),
        });
    }

    if !pathname.exists() {
        return Err(PathError::NotFound(text.to_string()));
    }

    if is_file && pathname.is_dir() {
        return Err(PathError::IsDirectory(text.to_string()));
    }

    Ok(())
}
