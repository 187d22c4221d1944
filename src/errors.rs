//! Crate-level error types
//!
//! `PathError` covers the pre-flight path checks done before a tile or
//! coordinate file is touched. `ChipError` is what every pipeline
//! operation returns; it wraps the path, TIFF, I/O, parse and output failures.

use std::fmt;
use std::io;
use std::path::PathBuf;

use ndarray_npy::WriteNpyError;

use crate::tiff::errors::TiffError;

/// The two failure kinds path validation distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathErrorKind {
    /// The path is malformed or names the wrong kind of entry
    InvalidPath,
    /// Nothing exists at the path
    PathNotFound,
}

/// Path validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path is absolute but must be relative
    AbsolutePath(String),
    /// The path is longer than the allowed number of characters
    TooLong { path: String, max_length: usize },
    /// The path contains a banned character
    BannedCharacter { path: String, character: char },
    /// The extension is not one of the allowed ones
    DisallowedExtension { path: String, allowed: Vec<String> },
    /// The path is a directory but a file is required
    IsDirectory(String),
    /// The path does not exist
    NotFound(String),
    /// The path is not valid UTF-8 and cannot be checked
    NotUtf8(PathBuf),
}

impl PathError {
    /// Classify the failure
    pub fn kind(&self) -> PathErrorKind {
        match self {
            PathError::NotFound(_) => PathErrorKind::PathNotFound,
            _ => PathErrorKind::InvalidPath,
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::AbsolutePath(path) => {
                write!(f, "File path is absolute and needs to be relative: {}", path)
            }
            PathError::TooLong { path, max_length } => {
                write!(f, "Pathname length exceeds {} characters: {}", max_length, path)
            }
            PathError::BannedCharacter { path, character } => {
                write!(f, "Character {:?} not allowed in path: {}", character, path)
            }
            PathError::DisallowedExtension { path, allowed } => {
                write!(f, "File type must be one of {:?}: {}", allowed, path)
            }
            PathError::IsDirectory(path) => {
                write!(f, "File path is a directory and needs to be a file: {}", path)
            }
            PathError::NotFound(path) => write!(f, "File path does not exist: {}", path),
            PathError::NotUtf8(path) => write!(f, "Path is not valid UTF-8: {}", path.display()),
        }
    }
}

impl std::error::Error for PathError {}

/// Errors produced by discovery and chip extraction
#[derive(Debug)]
pub enum ChipError {
    /// A tile or input path failed validation
    Path(PathError),
    /// A tile could not be decoded
    Tiff { path: PathBuf, source: TiffError },
    /// Raw I/O failure outside TIFF decoding (directory listing, output files)
    Io(io::Error),
    /// The coordinates document could not be parsed
    Coordinates(serde_json::Error),
    /// A configuration file could not be parsed
    ConfigFile(toml::de::Error),
    /// Invalid configuration (chip size, period count, band/period mismatch)
    Config(String),
    /// A coordinate could not be mapped to a pixel
    Index(String),
    /// A windowed read failed in the raster source
    Read(String),
    /// A chip could not be written as NPY
    Npy { path: PathBuf, source: WriteNpyError },
}

impl ChipError {
    /// Attach a tile path to a TIFF error
    pub fn tiff(path: impl Into<PathBuf>, source: TiffError) -> Self {
        ChipError::Tiff { path: path.into(), source }
    }

    /// The path validation kind, if this is a path error
    pub fn path_kind(&self) -> Option<PathErrorKind> {
        match self {
            ChipError::Path(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for ChipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipError::Path(e) => write!(f, "Invalid path: {}", e),
            ChipError::Tiff { path, source } => write!(f, "{}: {}", path.display(), source),
            ChipError::Io(e) => write!(f, "I/O error: {}", e),
            ChipError::Coordinates(e) => write!(f, "Invalid coordinates document: {}", e),
            ChipError::ConfigFile(e) => write!(f, "Invalid configuration file: {}", e),
            ChipError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            ChipError::Index(msg) => write!(f, "Indexing error: {}", msg),
            ChipError::Read(msg) => write!(f, "Read error: {}", msg),
            ChipError::Npy { path, source } => write!(f, "Failed to write {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for ChipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChipError::Path(e) => Some(e),
            ChipError::Tiff { source, .. } => Some(source),
            ChipError::Io(e) => Some(e),
            ChipError::Coordinates(e) => Some(e),
            ChipError::ConfigFile(e) => Some(e),
            ChipError::Npy { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PathError> for ChipError {
    fn from(error: PathError) -> Self {
        ChipError::Path(error)
    }
}

impl From<io::Error> for ChipError {
    fn from(error: io::Error) -> Self {
        ChipError::Io(error)
    }
}

impl From<serde_json::Error> for ChipError {
    fn from(error: serde_json::Error) -> Self {
        ChipError::Coordinates(error)
    }
}

impl From<toml::de::Error> for ChipError {
    fn from(error: toml::de::Error) -> Self {
        ChipError::ConfigFile(error)
    }
}

/// Result type for discovery and extraction
pub type ChipResult<T> = Result<T, ChipError>;
