//! Scratch directories for tests that go through path validation

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory under the working directory, addressed by a
/// relative path
///
/// Path validation rejects absolute paths, and `TempDir::path` is always
/// absolute, so tests use the directory name relative to the working
/// directory instead. The directory is removed on drop.
pub struct ScratchDir {
    _dir: TempDir,
    path: PathBuf,
}

impl ScratchDir {
    /// Relative path of the directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create a scratch directory named `<prefix><random>` in the working directory
pub fn scratch_dir(prefix: &str) -> ScratchDir {
    let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(".").unwrap();
    let path = PathBuf::from(dir.path().file_name().unwrap());
    ScratchDir { _dir: dir, path }
}

#[test]
fn scratch_dir_path_is_relative_and_exists() {
    let dir = scratch_dir("scratch");
    assert!(dir.path().is_relative());
    assert!(dir.path().is_dir());
}
