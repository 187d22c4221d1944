//! Splitting a window read into per-period chips

use ndarray::{Array3, Axis};

use crate::errors::{ChipError, ChipResult};

/// A `[bands_per_period, height, width]` patch for one period
pub type Chip = Array3<f64>;

/// Whether a window read holds no data
///
/// A read is empty when every value of its first band is zero. Any other
/// value, NaN included, makes it non-empty.
pub fn is_empty_read(read: &Array3<f64>) -> bool {
    if read.len_of(Axis(0)) == 0 {
        return true;
    }
    read.index_axis(Axis(0), 0).iter().all(|value| *value == 0.0)
}

/// Check that `band_count` splits evenly into `num_periods` groups
pub fn check_period_division(band_count: usize, num_periods: usize) -> ChipResult<usize> {
    if num_periods == 0 {
        return Err(ChipError::Config("number of periods must be at least 1".to_string()));
    }
    if band_count % num_periods != 0 {
        return Err(ChipError::Config(format!(
            "{} bands cannot be split evenly into {} periods", band_count, num_periods)));
    }
    Ok(band_count / num_periods)
}

/// Split a `[bands, height, width]` read into `num_periods` chips
///
/// Period `k` holds the `k`-th consecutive group of `bands / num_periods`
/// bands.
pub fn split_periods(read: &Array3<f64>, num_periods: usize) -> ChipResult<Vec<Chip>> {
    let bands_per_period = check_period_division(read.len_of(Axis(0)), num_periods)?;
    if bands_per_period == 0 {
        return Err(ChipError::Config("read has no bands to split".to_string()));
    }

    Ok(read.axis_chunks_iter(Axis(0), bands_per_period)
        .map(|chunk| chunk.to_owned())
        .collect())
}
