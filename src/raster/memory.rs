//! In-memory raster
//!
//! Holds a fully decoded `(bands, rows, cols)` array. Used by tests and by
//! callers that already have pixel data in hand.

use ndarray::{s, Array3};

use crate::errors::{ChipError, ChipResult};

use super::source::RasterSource;
use super::transform::GeoTransform;
use super::window::Window;

/// A raster backed by an owned array
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    data: Array3<f64>,
    transform: GeoTransform,
}

impl MemoryRaster {
    /// Wrap a `(bands, rows, cols)` array
    pub fn new(data: Array3<f64>, transform: GeoTransform) -> ChipResult<Self> {
        let (bands, rows, cols) = data.dim();
        if bands == 0 || rows == 0 || cols == 0 {
            return Err(ChipError::Read(format!("raster has empty shape {:?}", data.dim())));
        }
        Ok(MemoryRaster { data, transform })
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }
}

impl RasterSource for MemoryRaster {
    fn width(&self) -> usize {
        self.data.dim().2
    }

    fn height(&self) -> usize {
        self.data.dim().1
    }

    fn band_count(&self) -> usize {
        self.data.dim().0
    }

    fn geo_transform(&self) -> &GeoTransform {
        &self.transform
    }

    fn read_window(&mut self, window: &Window) -> ChipResult<Array3<f64>> {
        let mut out = Array3::<f64>::zeros((self.band_count(), window.height, window.width));

        if let Some((cols, rows)) = window.clip_to(self.width(), self.height()) {
            let out_rows = (rows.start as i64 - window.row_off) as usize..(rows.end as i64 - window.row_off) as usize;
            let out_cols = (cols.start as i64 - window.col_off) as usize..(cols.end as i64 - window.col_off) as usize;

            out.slice_mut(s![.., out_rows, out_cols])
                .assign(&self.data.slice(s![.., rows, cols]));
        }

        Ok(out)
    }
}
