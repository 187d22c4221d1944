//! Extraction results keyed by coordinate

use log::debug;
use ndarray_npy::write_npy;
use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::coordinate::Coordinate;
use crate::errors::{ChipError, ChipResult};

use super::periods::Chip;

/// The chips extracted for one coordinate and the tile they came from
#[derive(Debug, Clone, PartialEq)]
pub struct ChipSample {
    /// Tile that produced the chips
    pub source: PathBuf,
    /// One chip per period, in band order
    pub periods: Vec<Chip>,
}

impl ChipSample {
    pub fn new(source: impl Into<PathBuf>, periods: Vec<Chip>) -> Self {
        ChipSample { source: source.into(), periods }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of periods
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Coordinate → chips mapping, iterated in coordinate order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChipMap {
    samples: BTreeMap<Coordinate, ChipSample>,
}

impl ChipMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the chips for a coordinate, returning what they replace
    pub fn insert(&mut self, coordinate: Coordinate, sample: ChipSample) -> Option<ChipSample> {
        self.samples.insert(coordinate, sample)
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&ChipSample> {
        self.samples.get(coordinate)
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.samples.contains_key(coordinate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Coordinate, ChipSample> {
        self.samples.iter()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = &Coordinate> {
        self.samples.keys()
    }

    /// Write every chip as an NPY file
    ///
    /// Chips for a coordinate go to `<output_dir>/<x>_<y>/period_<k>.npy`
    /// as `<f8` arrays of shape `(bands, size, size)`.
    ///
    /// # Returns
    /// The number of files written
    pub fn save_npy(&self, output_dir: &Path) -> ChipResult<usize> {
        let mut written = 0;
        for (coordinate, sample) in &self.samples {
            let dir = output_dir.join(format!("{}_{}", coordinate.x, coordinate.y));
            fs::create_dir_all(&dir)?;

            for (k, chip) in sample.periods.iter().enumerate() {
                let path = dir.join(format!("period_{}.npy", k));
                write_npy(&path, chip).map_err(|source| ChipError::Npy { path, source })?;
                written += 1;
            }
            debug!("Saved {} chips for {} to {}", sample.len(), coordinate, dir.display());
        }
        Ok(written)
    }
}

impl IntoIterator for ChipMap {
    type Item = (Coordinate, ChipSample);
    type IntoIter = btree_map::IntoIter<Coordinate, ChipSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChipMap {
    type Item = (&'a Coordinate, &'a ChipSample);
    type IntoIter = btree_map::Iter<'a, Coordinate, ChipSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn insert_replaces_earlier_sample() {
        let mut map = ChipMap::new();
        let coordinate = Coordinate::new(1.0, 2.0);

        assert!(map.insert(coordinate, ChipSample::new("a.tif", vec![Array3::zeros((1, 1, 1))])).is_none());
        let previous = map.insert(coordinate, ChipSample::new("b.tif", vec![Array3::ones((1, 1, 1))]));

        assert_eq!(previous.unwrap().source(), Path::new("a.tif"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&coordinate).unwrap().source(), Path::new("b.tif"));
    }

    #[test]
    fn saves_one_file_per_period() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = ChipMap::new();
        map.insert(Coordinate::new(-74.5, 40.25),
                   ChipSample::new("a.tif", vec![Array3::zeros((2, 3, 3)), Array3::ones((2, 3, 3))]));

        assert_eq!(map.save_npy(dir.path()).unwrap(), 2);
        assert!(dir.path().join("-74.5_40.25").join("period_0.npy").is_file());
        assert!(dir.path().join("-74.5_40.25").join("period_1.npy").is_file());
    }

    #[test]
    fn saved_chips_load_back_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let chip = Array3::from_shape_fn((2, 3, 3), |(b, r, c)| (b * 9 + r * 3 + c) as f64 + 0.5);
        let mut map = ChipMap::new();
        map.insert(Coordinate::new(1.5, 8.5), ChipSample::new("a.tif", vec![chip.clone()]));
        map.save_npy(dir.path()).unwrap();

        let loaded: Array3<f64> = ndarray_npy::read_npy(dir.path().join("1.5_8.5").join("period_0.npy")).unwrap();
        assert_eq!(loaded, chip);
    }

    #[test]
    fn unwritable_output_is_an_npy_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = ChipMap::new();
        map.insert(Coordinate::new(0.0, 0.0), ChipSample::new("a.tif", vec![Array3::zeros((1, 1, 1))]));
        std::fs::create_dir_all(dir.path().join("0_0").join("period_0.npy")).unwrap();

        assert!(matches!(map.save_npy(dir.path()), Err(ChipError::Npy { .. })));
    }
}
