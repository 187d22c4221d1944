//! Coordinate handling
//!
//! The `Coordinate` value type used as the key of extraction results, and
//! loading of the coordinates document.

mod point;
mod file;

pub use self::point::Coordinate;
pub use self::file::{load_coordinates, parse_coordinates, CoordinateFile};
