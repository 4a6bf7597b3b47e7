//! Data-access abstraction over overpass files.

use std::path::{Path, PathBuf};

use crate::dataset::{GridDataset, GridExtent};
use crate::error::SwathResult;

/// Trait for reading overpass files from some on-disk format.
///
/// Implementations must be cheap to share between threads; every call opens
/// and releases its own file handle.
pub trait SwathSource: Send + Sync {
    /// List the overpass files in a folder, sorted by file name.
    fn list_files(&self, folder: &Path) -> SwathResult<Vec<PathBuf>>;

    /// Read only the coordinate extent of a file.
    ///
    /// Returns `Ok(None)` when the file holds no finite coordinates.
    fn extent(&self, file: &Path) -> SwathResult<Option<GridExtent>>;

    /// Load a file's coordinates, time and the requested variables.
    ///
    /// Requested variables the file does not contain are skipped, not
    /// reported as errors.
    fn open(&self, file: &Path, variables: &[String]) -> SwathResult<GridDataset>;
}

impl<S: SwathSource + ?Sized> SwathSource for &S {
    fn list_files(&self, folder: &Path) -> SwathResult<Vec<PathBuf>> {
        (**self).list_files(folder)
    }

    fn extent(&self, file: &Path) -> SwathResult<Option<GridExtent>> {
        (**self).extent(file)
    }

    fn open(&self, file: &Path, variables: &[String]) -> SwathResult<GridDataset> {
        (**self).open(file, variables)
    }
}

/// List regular files in `folder` whose extension equals `extension`
/// (case-insensitive), sorted by file name.
///
/// Subdirectories are not descended into.
pub fn list_files_with_extension(folder: &Path, extension: &str) -> SwathResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type()?.is_file() {
            continue;
        }

        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);

        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.nc", "a.nc", "b.NC", "notes.txt", "d.nc.tmp"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.nc")).unwrap();

        let files = list_files_with_extension(dir.path(), "nc").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a.nc", "b.NC", "c.nc"]);
    }

    #[test]
    fn test_list_files_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(list_files_with_extension(&missing, "nc").is_err());
    }
}
