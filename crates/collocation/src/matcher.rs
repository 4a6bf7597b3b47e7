//! Nearest in-radius grid cell of one overpass for one point.
//!
//! # Algorithm
//!
//! ```text
//! GridDataset + Point
//!      │
//!      ├─► Crop to cells with lon/lat inside point ± R/111°
//!      │     (bounding index window; cells in the window but outside the
//!      │      box are masked out)
//!      │
//!      ├─► Haversine distance for every cell in the window
//!      │
//!      ├─► Keep cells with distance <= R (inclusive)
//!      │
//!      └─► Minimum distance, ties to the first index in row-major order
//! ```
//!
//! The degree box is a coarse, non-geodesic crop and uses the same
//! `R / 111` approximation as the indexer. Near the poles a degree of
//! longitude is much shorter than 111 km, so in-radius cells beyond the box
//! in longitude are never considered.

use std::ops::Range;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use ndarray::{ArrayD, ArrayViewD, Dimension, Slice, Zip};
use swath_parser::{GridDataset, SwathSource};
use tracing::{debug, trace};

use crate::distance::{degree_padding, haversine_grid_km};
use crate::error::{CollocationError, Result};
use crate::types::{is_base_column, Match, Point};

/// Open `file` through `source` and find the nearest in-radius cell.
///
/// Returns `Ok(None)` when no cell lies within `radius_km`. A file that
/// cannot be opened or read is an error, never a silent `None`. The loaded
/// dataset is dropped before returning on every path.
pub fn match_one<S: SwathSource + ?Sized>(
    source: &S,
    file: &Path,
    point: &Point,
    radius_km: f64,
    variables: &[String],
) -> Result<Option<Match>> {
    let dataset = source
        .open(file, variables)
        .map_err(|e| CollocationError::data_access(file, e))?;

    match_in_dataset(&dataset, file, point, radius_km, variables)
}

/// Find the nearest in-radius cell of an already loaded dataset.
///
/// Requested variables present in the dataset are copied from the matched
/// cell (`None` when the stored value is not finite); requested variables
/// the dataset lacks are left out of the match.
pub fn match_in_dataset(
    dataset: &GridDataset,
    file: &Path,
    point: &Point,
    radius_km: f64,
    variables: &[String],
) -> Result<Option<Match>> {
    let pad = degree_padding(radius_km);

    let Some(window) = CropWindow::around(dataset, point, pad) else {
        trace!(file = %file.display(), point = %point.name, "No cells inside degree box");
        return Ok(None);
    };

    let lon = window.apply(dataset.lon());
    let lat = window.apply(dataset.lat());

    let mut distances = haversine_grid_km(lon.view(), lat.view(), point.lon, point.lat)?;
    Zip::from(&mut distances)
        .and(&lon)
        .and(&lat)
        .for_each(|d, &x, &y| {
            if !in_box(point, pad, x, y) {
                *d = f64::NAN;
            }
        });

    let Some((local, distance_km)) = nearest_within(&distances, radius_km) else {
        trace!(file = %file.display(), point = %point.name, "No cells inside radius");
        return Ok(None);
    };

    let index = window.to_global(&local);
    let at = index.as_slice();

    let values = variables
        .iter()
        .filter(|name| !is_base_column(name))
        .filter_map(|name| {
            dataset.variable(name).map(|array| {
                let value = array[at];
                (name.clone(), value.is_finite().then_some(value))
            })
        })
        .collect();

    let pixel_lon = dataset.lon()[at];
    let pixel_lat = dataset.lat()[at];
    let pixel_time = to_datetime(dataset.time()[at]);

    let found = Match {
        point: point.name.clone(),
        file: file.to_path_buf(),
        pixel_lon,
        pixel_lat,
        pixel_time,
        distance_km,
        grid_index: index,
        values,
    };

    debug!(
        file = %file.display(),
        point = %point.name,
        distance_km = found.distance_km,
        index = ?found.grid_index,
        "Matched cell"
    );

    Ok(Some(found))
}

fn in_box(point: &Point, pad: f64, lon: f64, lat: f64) -> bool {
    lon >= point.lon - pad && lon <= point.lon + pad && lat >= point.lat - pad && lat <= point.lat + pad
}

/// Index window spanning every cell inside the degree box, per axis.
#[derive(Debug, Clone, PartialEq)]
struct CropWindow {
    ranges: Vec<Range<usize>>,
}

impl CropWindow {
    /// `None` when no cell falls inside the box.
    fn around(dataset: &GridDataset, point: &Point, pad: f64) -> Option<Self> {
        let ndim = dataset.shape().len();
        let mut lo = vec![usize::MAX; ndim];
        let mut hi = vec![0; ndim];
        let mut any = false;

        for ((idx, &x), &y) in dataset.lon().indexed_iter().zip(dataset.lat().iter()) {
            if !in_box(point, pad, x, y) {
                continue;
            }
            any = true;
            for (axis, &i) in idx.slice().iter().enumerate() {
                lo[axis] = lo[axis].min(i);
                hi[axis] = hi[axis].max(i + 1);
            }
        }

        any.then(|| Self {
            ranges: lo.into_iter().zip(hi).map(|(start, end)| start..end).collect(),
        })
    }

    fn apply<'a>(&self, mut array: ArrayViewD<'a, f64>) -> ArrayViewD<'a, f64> {
        array.slice_each_axis_inplace(|ax| Slice::from(self.ranges[ax.axis.index()].clone()));
        array
    }

    fn to_global(&self, local: &[usize]) -> Vec<usize> {
        local
            .iter()
            .zip(&self.ranges)
            .map(|(i, range)| range.start + i)
            .collect()
    }
}

/// Index and distance of the smallest distance `<= radius_km`.
///
/// Iterates in logical row-major order and only replaces on a strictly
/// smaller distance, so ties go to the lexicographically first index. NaN
/// distances never qualify.
fn nearest_within(distances: &ArrayD<f64>, radius_km: f64) -> Option<(Vec<usize>, f64)> {
    let mut best: Option<(Vec<usize>, f64)> = None;

    for (idx, &d) in distances.indexed_iter() {
        if d.is_nan() || d > radius_km {
            continue;
        }
        let better = best.as_ref().map_or(true, |(_, best_d)| d < *best_d);
        if better {
            best = Some((idx.slice().to_vec(), d));
        }
    }

    best
}

/// Seconds since the Unix epoch to a UTC timestamp; `None` for NaN.
fn to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    Utc.timestamp_opt(whole as i64, nanos).single()
}
