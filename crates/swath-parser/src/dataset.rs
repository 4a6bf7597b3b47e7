//! In-memory representation of one overpass grid.

use std::collections::BTreeMap;

use ndarray::{ArrayD, ArrayViewD, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{SwathError, SwathResult};

/// Geographic extent of a swath in degrees.
///
/// Computed from finite coordinates only; fill values decoded as NaN are
/// ignored. Longitudes are taken as stored, so a swath crossing the
/// antimeridian reports an extent spanning the whole longitude range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridExtent {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GridExtent {
    /// Create a new extent.
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    /// Compute the extent of co-indexed coordinate arrays.
    ///
    /// Returns `None` when no cell has both a finite longitude and latitude.
    pub fn from_coordinates(lon: ArrayViewD<'_, f64>, lat: ArrayViewD<'_, f64>) -> Option<Self> {
        let mut extent: Option<Self> = None;
        for (&x, &y) in lon.iter().zip(lat.iter()) {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            extent = Some(match extent {
                None => Self::new(x, x, y, y),
                Some(e) => Self::new(
                    e.min_lon.min(x),
                    e.max_lon.max(x),
                    e.min_lat.min(y),
                    e.max_lat.max(y),
                ),
            });
        }
        extent
    }

    /// Expand the extent by a buffer amount (in degrees) on every side.
    pub fn expand(&self, buffer: f64) -> Self {
        Self {
            min_lon: self.min_lon - buffer,
            max_lon: self.max_lon + buffer,
            min_lat: self.min_lat - buffer,
            max_lat: self.max_lat + buffer,
        }
    }

    /// Check if a point is contained within this extent (bounds inclusive).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// An overpass grid: co-indexed longitude, latitude and time arrays plus
/// named numeric variables, all sharing one N-dimensional shape.
///
/// Time is stored as seconds since the Unix epoch, with NaN for missing
/// timestamps. The grid is not assumed to be rectilinear.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDataset {
    lon: ArrayD<f64>,
    lat: ArrayD<f64>,
    time: ArrayD<f64>,
    variables: BTreeMap<String, ArrayD<f64>>,
}

impl GridDataset {
    /// Build a dataset from coordinate arrays.
    ///
    /// `lat` must have the same shape as `lon`. `time` must either match the
    /// grid shape or be a leading prefix of it (for example one timestamp per
    /// scan line), in which case it is broadcast along the trailing axes.
    pub fn new(lon: ArrayD<f64>, lat: ArrayD<f64>, time: ArrayD<f64>) -> SwathResult<Self> {
        if lat.shape() != lon.shape() {
            return Err(SwathError::shape_mismatch("lat", lon.shape(), lat.shape()));
        }
        let time = broadcast_leading(time, lon.shape(), "time")?;

        Ok(Self {
            lon,
            lat,
            time,
            variables: BTreeMap::new(),
        })
    }

    /// Attach a named variable. Its shape must match the grid shape.
    pub fn with_variable(mut self, name: impl Into<String>, values: ArrayD<f64>) -> SwathResult<Self> {
        self.insert_variable(name, values)?;
        Ok(self)
    }

    /// Insert or replace a named variable.
    pub fn insert_variable(&mut self, name: impl Into<String>, values: ArrayD<f64>) -> SwathResult<()> {
        let name = name.into();
        if values.shape() != self.shape() {
            return Err(SwathError::shape_mismatch(name, self.shape(), values.shape()));
        }
        self.variables.insert(name, values);
        Ok(())
    }

    /// Grid shape shared by every array.
    pub fn shape(&self) -> &[usize] {
        self.lon.shape()
    }

    /// Number of grid cells.
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    pub fn lon(&self) -> ArrayViewD<'_, f64> {
        self.lon.view()
    }

    pub fn lat(&self) -> ArrayViewD<'_, f64> {
        self.lat.view()
    }

    pub fn time(&self) -> ArrayViewD<'_, f64> {
        self.time.view()
    }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Option<ArrayViewD<'_, f64>> {
        self.variables.get(name).map(|values| values.view())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Names of the loaded variables, sorted.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Extent of the finite coordinates, if any.
    pub fn extent(&self) -> Option<GridExtent> {
        GridExtent::from_coordinates(self.lon.view(), self.lat.view())
    }
}

/// Broadcast an array whose shape is a leading prefix of `shape` to `shape`.
fn broadcast_leading(values: ArrayD<f64>, shape: &[usize], name: &str) -> SwathResult<ArrayD<f64>> {
    if values.shape() == shape {
        return Ok(values);
    }

    let ndim = values.ndim();
    if ndim > shape.len() || values.shape() != &shape[..ndim] {
        return Err(SwathError::shape_mismatch(name, shape, values.shape()));
    }

    let mut expanded = values;
    for axis in ndim..shape.len() {
        expanded = expanded.insert_axis(Axis(axis));
    }

    expanded
        .broadcast(shape)
        .map(|view| view.to_owned())
        .ok_or_else(|| SwathError::shape_mismatch(name, shape, expanded.shape()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, ArrayD, IxDyn};

    fn grid_2x3() -> (ArrayD<f64>, ArrayD<f64>) {
        let lon = arr2(&[[10.0, 10.5, 11.0], [10.1, 10.6, 11.1]]).into_dyn();
        let lat = arr2(&[[20.0, 20.1, 20.2], [20.5, 20.6, 20.7]]).into_dyn();
        (lon, lat)
    }

    #[test]
    fn test_new_rejects_lat_shape_mismatch() {
        let (lon, _) = grid_2x3();
        let lat = ArrayD::zeros(IxDyn(&[3, 2]));
        let time = ArrayD::zeros(IxDyn(&[2, 3]));
        let err = GridDataset::new(lon, lat, time).unwrap_err();
        assert!(matches!(err, SwathError::ShapeMismatch { ref name, .. } if name == "lat"));
    }

    #[test]
    fn test_time_per_scan_line_is_broadcast() {
        let (lon, lat) = grid_2x3();
        let time = arr1(&[100.0, 200.0]).into_dyn();
        let ds = GridDataset::new(lon, lat, time).unwrap();

        assert_eq!(ds.time().shape(), &[2, 3]);
        assert_eq!(ds.time()[[0, 2]], 100.0);
        assert_eq!(ds.time()[[1, 0]], 200.0);
    }

    #[test]
    fn test_scalar_time_is_broadcast() {
        let (lon, lat) = grid_2x3();
        let time = ArrayD::from_elem(IxDyn(&[]), 42.0);
        let ds = GridDataset::new(lon, lat, time).unwrap();
        assert!(ds.time().iter().all(|&t| t == 42.0));
    }

    #[test]
    fn test_time_trailing_axis_is_rejected() {
        let (lon, lat) = grid_2x3();
        let time = arr1(&[1.0, 2.0, 3.0]).into_dyn();
        assert!(GridDataset::new(lon, lat, time).is_err());
    }

    #[test]
    fn test_variable_shape_checked() {
        let (lon, lat) = grid_2x3();
        let time = ArrayD::zeros(IxDyn(&[2, 3]));
        let ds = GridDataset::new(lon, lat, time).unwrap();

        let bad = ArrayD::zeros(IxDyn(&[6]));
        assert!(ds.clone().with_variable("ssh", bad).is_err());

        let good = ArrayD::from_elem(IxDyn(&[2, 3]), 1.5);
        let ds = ds.with_variable("ssh", good).unwrap();
        assert!(ds.has_variable("ssh"));
        assert!(!ds.has_variable("swh"));
        assert_eq!(ds.variable_names().collect::<Vec<_>>(), vec!["ssh"]);
    }

    #[test]
    fn test_extent_ignores_non_finite() {
        let lon = arr2(&[[f64::NAN, 10.5], [9.5, 11.0]]).into_dyn();
        let lat = arr2(&[[-80.0, 20.0], [21.0, f64::NAN]]).into_dyn();
        let extent = GridExtent::from_coordinates(lon.view(), lat.view()).unwrap();

        assert_eq!(extent, GridExtent::new(9.5, 10.5, 20.0, 21.0));
    }

    #[test]
    fn test_extent_none_without_finite_cells() {
        let lon = arr1(&[f64::NAN, 1.0]).into_dyn();
        let lat = arr1(&[1.0, f64::NAN]).into_dyn();
        assert!(GridExtent::from_coordinates(lon.view(), lat.view()).is_none());
    }

    #[test]
    fn test_extent_expand_and_contains() {
        let extent = GridExtent::new(10.0, 11.0, 20.0, 21.0).expand(0.5);
        assert!(extent.contains(9.5, 21.5));
        assert!(extent.contains(10.5, 20.5));
        assert!(!extent.contains(9.49, 20.5));
        assert!(!extent.contains(10.5, 21.51));
    }
}
