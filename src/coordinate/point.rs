//! Point structure for representing coordinates

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A geographic coordinate in the raster's CRS
///
/// Equality is exact: two coordinates are the same key only if both
/// components have the same value. Ordering uses IEEE total order, so
/// `-0.0` and `0.0` are distinct keys and NaN sorts last.
#[derive(Debug, Clone, Copy)]
pub struct Coordinate {
    /// X coordinate (longitude / easting)
    pub x: f64,
    /// Y coordinate (latitude / northing)
    pub y: f64,
}

impl Coordinate {
    /// Create a new coordinate
    pub fn new(x: f64, y: f64) -> Self {
        Coordinate { x, y }
    }

    /// Whether both components are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(pair: [f64; 2]) -> Self {
        Coordinate::new(pair[0], pair[1])
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Coordinate::new(x, y)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Coordinate {}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x.total_cmp(&other.x).then_with(|| self.y.total_cmp(&other.y))
    }
}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
