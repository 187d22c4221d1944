//! Window structure for windowed raster reads
//!
//! A window is a rectangle of pixels given by its top-left corner and its
//! size. The corner uses signed coordinates: a coordinate that resolves
//! to a pixel left of or above a tile produces a window with a negative
//! origin, and reads fill the part outside the raster with zeros.

use std::ops::Range;

/// Rectangular pixel window (column/row origin plus size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Column of the top-left corner (pixels from left, may be negative)
    pub col_off: i64,

    /// Row of the top-left corner (pixels from top, may be negative)
    pub row_off: i64,

    /// Width of the window in pixels
    pub width: usize,

    /// Height of the window in pixels
    pub height: usize,
}

impl Window {
    /// Create a new window
    ///
    /// # Arguments
    /// * `col_off` - Column of the top-left corner
    /// * `row_off` - Row of the top-left corner
    /// * `width` - Width of the window in pixels
    /// * `height` - Height of the window in pixels
    pub fn new(col_off: i64, row_off: i64, width: usize, height: usize) -> Self {
        Window { col_off, row_off, width, height }
    }

    /// Create a square window of side `size` with its corner at (`col_off`, `row_off`)
    pub fn square(col_off: i64, row_off: i64, size: usize) -> Self {
        Self::new(col_off, row_off, size, size)
    }

    /// Column immediately right of the window (exclusive)
    pub fn end_col(&self) -> i64 {
        self.col_off + self.width as i64
    }

    /// Row immediately below the window (exclusive)
    pub fn end_row(&self) -> i64 {
        self.row_off + self.height as i64
    }

    /// Clip the window against a raster of the given size
    ///
    /// Returns the raster column and row ranges covered by both the window
    /// and the raster, or `None` when they do not overlap.
    pub fn clip_to(&self, raster_width: usize, raster_height: usize) -> Option<(Range<usize>, Range<usize>)> {
        let col_start = self.col_off.max(0);
        let row_start = self.row_off.max(0);
        let col_end = self.end_col().min(raster_width as i64);
        let row_end = self.end_row().min(raster_height as i64);

        if col_start >= col_end || row_start >= row_end {
            return None;
        }

        Some((col_start as usize..col_end as usize, row_start as usize..row_end as usize))
    }
}
