//! Temporary folders of swath files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use swath_parser::{GridDataset, JsonSwathSource};
use tempfile::TempDir;

/// Write a dataset as a JSON swath file and return its path.
pub fn write_swath(dir: &Path, name: &str, dataset: &GridDataset) -> PathBuf {
    let path = dir.join(name);
    JsonSwathSource::write(&path, dataset).expect("failed to write test swath");
    path
}

/// Write a file that no swath reader can parse.
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"\x89HDF\r\n not a swath").expect("failed to write corrupt file");
    path
}

/// A temporary folder populated with swath files.
///
/// The folder is removed when the value is dropped.
///
/// ```ignore
/// let folder = SwathFolder::new()
///     .with_swath("a.json", &create_swath(&SwathSpec::centered_on(0.0, 0.0)))
///     .with_corrupt("broken.json");
/// ```
pub struct SwathFolder {
    dir: TempDir,
}

impl SwathFolder {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn with_swath(self, name: &str, dataset: &GridDataset) -> Self {
        write_swath(self.dir.path(), name, dataset);
        self
    }

    pub fn with_corrupt(self, name: &str) -> Self {
        write_corrupt(self.dir.path(), name);
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the folder.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for SwathFolder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::create_regular_swath;

    #[test]
    fn test_folder_holds_written_files() {
        let folder = SwathFolder::new()
            .with_swath("a.json", &create_regular_swath(0.0, 0.0, 2, 2, 0.1, 0.0))
            .with_corrupt("b.json");

        assert!(folder.file("a.json").is_file());
        assert!(folder.file("b.json").is_file());
    }

    #[test]
    fn test_folder_removed_on_drop() {
        let path = {
            let folder = SwathFolder::new();
            folder.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
