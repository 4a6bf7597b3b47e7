//! JSON swath documents.
//!
//! A lightweight on-disk form of [`GridDataset`], used for fixtures and for
//! pipelines that pre-extract swaths from their native format. Arrays are
//! flattened in row-major order; `null` entries decode as NaN.
//!
//! ```json
//! {
//!   "shape": [2, 3],
//!   "lon": [10.0, 10.5, 11.0, 10.1, 10.6, 11.1],
//!   "lat": [20.0, 20.1, 20.2, 20.5, 20.6, 20.7],
//!   "time_shape": [2],
//!   "time": [1700000000.0, 1700000001.0],
//!   "variables": { "ssh_karin": [0.1, 0.2, null, 0.4, 0.5, 0.6] }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{GridDataset, GridExtent};
use crate::error::{SwathError, SwathResult};
use crate::source::{list_files_with_extension, SwathSource};

/// Serialized form of a swath.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwathDocument {
    pub shape: Vec<usize>,
    pub lon: Vec<Option<f64>>,
    pub lat: Vec<Option<f64>>,
    /// Shape of `time` when it is not the full grid shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_shape: Option<Vec<usize>>,
    pub time: Vec<Option<f64>>,
    #[serde(default)]
    pub variables: BTreeMap<String, Vec<Option<f64>>>,
}

/// Only the coordinate arrays; everything else in the document is skipped.
#[derive(Deserialize)]
struct CoordinateDocument {
    lon: Vec<Option<f64>>,
    lat: Vec<Option<f64>>,
}

impl SwathDocument {
    /// Build a document from a dataset, writing NaN as `null`.
    pub fn from_dataset(dataset: &GridDataset) -> Self {
        let variables = dataset
            .variable_names()
            .filter_map(|name| {
                dataset
                    .variable(name)
                    .map(|values| (name.to_string(), encode(values.iter())))
            })
            .collect();

        Self {
            shape: dataset.shape().to_vec(),
            lon: encode(dataset.lon().iter()),
            lat: encode(dataset.lat().iter()),
            time_shape: None,
            time: encode(dataset.time().iter()),
            variables,
        }
    }

    /// Convert into a dataset, keeping only the listed variables.
    pub fn into_dataset(self, variables: &[String]) -> SwathResult<GridDataset> {
        let lon = decode(self.lon, &self.shape, "lon")?;
        let lat = decode(self.lat, &self.shape, "lat")?;
        let time_shape = self.time_shape.unwrap_or_else(|| self.shape.clone());
        let time = decode(self.time, &time_shape, "time")?;

        let mut dataset = GridDataset::new(lon, lat, time)?;
        for (name, values) in self.variables {
            if !variables.contains(&name) {
                continue;
            }
            let values = decode(values, &self.shape, &name)?;
            dataset.insert_variable(name, values)?;
        }

        Ok(dataset)
    }
}

fn encode<'a>(values: impl Iterator<Item = &'a f64>) -> Vec<Option<f64>> {
    values.map(|&v| v.is_finite().then_some(v)).collect()
}

fn decode(values: Vec<Option<f64>>, shape: &[usize], name: &str) -> SwathResult<ArrayD<f64>> {
    let found = values.len();
    let flat: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    ArrayD::from_shape_vec(IxDyn(shape), flat)
        .map_err(|_| SwathError::shape_mismatch(name, shape, &[found]))
}

/// Reads `*.json` swath documents from a folder.
#[derive(Debug, Clone)]
pub struct JsonSwathSource {
    extension: String,
}

impl Default for JsonSwathSource {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
        }
    }
}

impl JsonSwathSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different file extension (without the leading dot).
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Write a dataset to `path` as a swath document.
    pub fn write(path: &Path, dataset: &GridDataset) -> SwathResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &SwathDocument::from_dataset(dataset))?;
        Ok(())
    }

    fn read<T: for<'de> Deserialize<'de>>(path: &Path) -> SwathResult<T> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl SwathSource for JsonSwathSource {
    fn list_files(&self, folder: &Path) -> SwathResult<Vec<PathBuf>> {
        list_files_with_extension(folder, &self.extension)
    }

    fn extent(&self, file: &Path) -> SwathResult<Option<GridExtent>> {
        let coords: CoordinateDocument = Self::read(file)?;
        if coords.lon.len() != coords.lat.len() {
            return Err(SwathError::shape_mismatch(
                "lat",
                &[coords.lon.len()],
                &[coords.lat.len()],
            ));
        }

        let n = coords.lon.len();
        let lon = decode(coords.lon, &[n], "lon")?;
        let lat = decode(coords.lat, &[n], "lat")?;
        Ok(GridExtent::from_coordinates(lon.view(), lat.view()))
    }

    fn open(&self, file: &Path, variables: &[String]) -> SwathResult<GridDataset> {
        debug!(file = %file.display(), "Opening JSON swath");
        let document: SwathDocument = Self::read(file)?;
        document.into_dataset(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn sample() -> GridDataset {
        let lon = arr2(&[[10.0, 10.5], [10.1, 10.6]]).into_dyn();
        let lat = arr2(&[[20.0, 20.1], [20.5, f64::NAN]]).into_dyn();
        let time = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        GridDataset::new(lon, lat, time)
            .unwrap()
            .with_variable("ssh", arr2(&[[0.1, f64::NAN], [0.3, 0.4]]).into_dyn())
            .unwrap()
            .with_variable("swh", arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn())
            .unwrap()
    }

    #[test]
    fn test_write_then_open_keeps_requested_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pass.json");
        JsonSwathSource::write(&path, &sample()).unwrap();

        let source = JsonSwathSource::new();
        let ds = source.open(&path, &["ssh".to_string(), "absent".to_string()]).unwrap();

        assert_eq!(ds.shape(), &[2, 2]);
        assert!(ds.has_variable("ssh"));
        assert!(!ds.has_variable("swh"));
        assert!(!ds.has_variable("absent"));
        assert!(ds.variable("ssh").unwrap()[[0, 1]].is_nan());
        assert!(ds.lat()[[1, 1]].is_nan());
    }

    #[test]
    fn test_extent_reads_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pass.json");
        JsonSwathSource::write(&path, &sample()).unwrap();

        let extent = JsonSwathSource::new().extent(&path).unwrap().unwrap();
        assert_eq!(extent, GridExtent::new(10.0, 10.5, 20.0, 20.5));
    }

    #[test]
    fn test_time_shape_prefix() {
        let json = r#"{
            "shape": [2, 2],
            "lon": [0.0, 1.0, 0.0, 1.0],
            "lat": [0.0, 0.0, 1.0, 1.0],
            "time_shape": [2],
            "time": [10.0, null]
        }"#;
        let doc: SwathDocument = serde_json::from_str(json).unwrap();
        let ds = doc.into_dataset(&[]).unwrap();

        assert_eq!(ds.time()[[0, 1]], 10.0);
        assert!(ds.time()[[1, 0]].is_nan());
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let json = r#"{"shape": [2, 2], "lon": [0.0], "lat": [0.0], "time": [0.0]}"#;
        let doc: SwathDocument = serde_json::from_str(json).unwrap();
        assert!(matches!(
            doc.into_dataset(&[]),
            Err(SwathError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"not json at all").unwrap();

        let source = JsonSwathSource::new();
        assert!(matches!(source.extent(&path), Err(SwathError::JsonError(_))));
        assert!(matches!(source.open(&path, &[]), Err(SwathError::JsonError(_))));
    }
}
