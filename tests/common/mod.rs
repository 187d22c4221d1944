//! Shared fixtures: relative scratch directories and GeoTIFF tiles

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chipkit::{GeoTiffBuilder, GeoTransform};
use ndarray::Array3;
use tempfile::TempDir;

/// Temporary directory under the working directory, addressed relatively
///
/// Path validation rejects absolute paths and `TempDir::path` is absolute.
pub struct ScratchDir {
    _dir: TempDir,
    path: PathBuf,
}

impl ScratchDir {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn scratch_dir(prefix: &str) -> ScratchDir {
    let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(".").unwrap();
    let path = PathBuf::from(dir.path().file_name().unwrap());
    ScratchDir { _dir: dir, path }
}

/// A tile of `bands x size x size` pixels with 1-unit pixels whose upper
/// left corner is `(origin_x, origin_y)`
pub fn write_tile(dir: &Path, name: &str, origin_x: f64, origin_y: f64, data: Array3<f64>) -> PathBuf {
    let path = dir.join(name);
    GeoTiffBuilder::new(data, GeoTransform::north_up(origin_x, origin_y, 1.0, 1.0))
        .write(&path)
        .unwrap();
    path
}

/// Band-major test data; never zero
pub fn ramp(bands: usize, size: usize) -> Array3<f64> {
    Array3::from_shape_fn((bands, size, size), |(b, r, c)| (1 + b + r * 2 + c) as f64)
}

pub fn write_coordinates(dir: &Path, coordinates: &[[f64; 2]]) -> PathBuf {
    let path = dir.join("coordinates.json");
    let pairs: Vec<String> = coordinates.iter().map(|[x, y]| format!("[{}, {}]", x, y)).collect();
    fs::write(&path, format!("{{\"coordinates\": [{}]}}", pairs.join(", "))).unwrap();
    path
}
