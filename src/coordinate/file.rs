//! Coordinates document loading
//!
//! The document is a GeoJSON-like object whose `coordinates` member holds
//! `[x, y]` pairs, e.g. a MultiPoint geometry:
//!
//! ```json
//! {"type": "MultiPoint", "coordinates": [[-74.79, 40.94], [-74.80, 40.95]]}
//! ```
//!
//! Other members are ignored.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::ChipResult;

use super::point::Coordinate;

/// Serialized form of the coordinates document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateFile {
    pub coordinates: Vec<[f64; 2]>,
}

impl CoordinateFile {
    /// The coordinates in document order
    pub fn to_coordinates(&self) -> Vec<Coordinate> {
        self.coordinates.iter().copied().map(Coordinate::from).collect()
    }
}

/// Parse a coordinates document from a string
pub fn parse_coordinates(content: &str) -> ChipResult<Vec<Coordinate>> {
    let file: CoordinateFile = serde_json::from_str(content)?;
    Ok(file.to_coordinates())
}

/// Load the coordinates document at `path`
///
/// Duplicate pairs are kept; they resolve to the same result key.
pub fn load_coordinates(path: &Path) -> ChipResult<Vec<Coordinate>> {
    let content = fs::read_to_string(path)?;
    let coordinates = parse_coordinates(&content)?;
    debug!("Loaded {} coordinates from {}", coordinates.len(), path.display());
    Ok(coordinates)
}
