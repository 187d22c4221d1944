//! Affine georeferencing for raster tiles
//!
//! The transform follows the usual six-coefficient layout
//! `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`
//! where world `x = origin_x + col * pixel_width + row * row_rotation` and
//! `y = origin_y + col * col_rotation + row * pixel_height`.

use std::fmt;

use crate::coordinate::Coordinate;
use crate::errors::{ChipError, ChipResult};
use crate::tiff::errors::{TiffError, TiffResult};

/// Integer pixel location produced by indexing a coordinate
///
/// Both components may be negative or beyond the raster extent; indexing
/// does not bounds-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelIndex {
    pub row: i64,
    pub col: i64,
}

impl PixelIndex {
    pub fn new(row: i64, col: i64) -> Self {
        PixelIndex { row, col }
    }
}

/// Affine pixel → world transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build a north-up transform from the upper-left corner and pixel size
    ///
    /// `pixel_height` is the (positive) ground size of a row; the stored
    /// coefficient is negated since rows grow southwards.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        GeoTransform {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height: -pixel_height,
        }
    }

    /// Build a transform from GeoTIFF ModelTiepoint and ModelPixelScale values
    ///
    /// # Arguments
    /// * `tiepoint` - At least one tiepoint `[i, j, k, x, y, z]`
    /// * `pixel_scale` - `[scale_x, scale_y, scale_z]` (at least two values)
    pub fn from_tiepoint_and_scale(tiepoint: &[f64], pixel_scale: &[f64]) -> TiffResult<Self> {
        if pixel_scale.len() < 2 || tiepoint.len() < 6 {
            return Err(TiffError::GenericError("Incomplete GeoTIFF tiepoint/scale information".to_string()));
        }

        let pixel_width = pixel_scale[0];
        let pixel_height = -pixel_scale[1];
        let origin_x = tiepoint[3] - tiepoint[0] * pixel_width;
        let origin_y = tiepoint[4] - tiepoint[1] * pixel_height;

        Self::checked(GeoTransform {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        })
    }

    /// Build a transform from a GeoTIFF ModelTransformation 4x4 matrix (row-major)
    pub fn from_model_transformation(matrix: &[f64]) -> TiffResult<Self> {
        if matrix.len() < 16 {
            return Err(TiffError::GenericError(format!(
                "ModelTransformation needs 16 values, found {}", matrix.len())));
        }

        Self::checked(GeoTransform {
            origin_x: matrix[3],
            pixel_width: matrix[0],
            row_rotation: matrix[1],
            origin_y: matrix[7],
            col_rotation: matrix[4],
            pixel_height: matrix[5],
        })
    }

    /// Move the origin from the center of the upper-left pixel to its corner
    ///
    /// PixelIsPoint tiles tie world coordinates to pixel centers while
    /// indexing works from pixel corners.
    pub fn point_to_area(&self) -> Self {
        let (origin_x, origin_y) = self.pixel_to_world(-0.5, -0.5);
        GeoTransform { origin_x, origin_y, ..*self }
    }

    /// Reject transforms that cannot be inverted
    fn checked(transform: Self) -> TiffResult<Self> {
        let det = transform.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(TiffError::GenericError(format!("Degenerate geotransform: {}", transform)));
        }
        Ok(transform)
    }

    fn determinant(&self) -> f64 {
        self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation
    }

    /// World position of a pixel's top-left corner
    pub fn pixel_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        )
    }

    /// Fractional (col, row) position of a world coordinate
    pub fn world_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.determinant();
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (self.pixel_width * dy - self.col_rotation * dx) / det;
        (col, row)
    }

    /// The pixel containing a coordinate (floor of the fractional position)
    pub fn index(&self, coordinate: &Coordinate) -> ChipResult<PixelIndex> {
        if !coordinate.is_finite() {
            return Err(ChipError::Index(format!("coordinate {} is not finite", coordinate)));
        }

        let (col, row) = self.world_to_pixel(coordinate.x, coordinate.y);
        let (col, row) = (col.floor(), row.floor());

        // i64 casts saturate silently, so range-check first
        let limit = i64::MAX as f64 / 2.0;
        if !col.is_finite() || !row.is_finite() || col.abs() > limit || row.abs() > limit {
            return Err(ChipError::Index(format!(
                "coordinate {} does not map to a pixel (col {}, row {})", coordinate, col, row)));
        }

        Ok(PixelIndex::new(row as i64, col as i64))
    }
}

impl fmt::Display for GeoTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}, {}, {}]",
               self.origin_x, self.pixel_width, self.row_rotation,
               self.origin_y, self.col_rotation, self.pixel_height)
    }
}
