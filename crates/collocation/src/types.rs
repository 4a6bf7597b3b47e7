//! Core types for collocation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CollocationError, Result};

/// A stationary point observation (e.g. a moored buoy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Unique name.
    pub name: String,
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(name: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            name: name.into(),
            lon,
            lat,
        }
    }
}

/// Check that point names are unique and coordinates are finite.
pub fn validate_points(points: &[Point]) -> Result<()> {
    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !point.lon.is_finite() || !point.lat.is_finite() {
            return Err(CollocationError::invalid_input(format!(
                "point '{}' has non-finite coordinates ({}, {})",
                point.name, point.lon, point.lat
            )));
        }
        if !seen.insert(point.name.as_str()) {
            return Err(CollocationError::invalid_input(format!(
                "duplicate point name '{}'",
                point.name
            )));
        }
    }
    Ok(())
}

/// Check that a search radius is usable.
pub fn validate_radius(radius_km: f64) -> Result<()> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(CollocationError::invalid_input(format!(
            "search radius must be a positive number of km, got {}",
            radius_km
        )));
    }
    Ok(())
}

/// Per-point shortlist of overpass files whose padded extent could contain
/// the point.
///
/// May over-include; never omits a file that actually overlaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    entries: BTreeMap<String, Vec<PathBuf>>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty entry for every point.
    pub fn for_points(points: &[Point]) -> Self {
        Self {
            entries: points
                .iter()
                .map(|p| (p.name.clone(), Vec::new()))
                .collect(),
        }
    }

    /// Append a file to a point's list, creating the entry if needed.
    pub fn push(&mut self, point: &str, file: impl Into<PathBuf>) {
        self.entries
            .entry(point.to_string())
            .or_default()
            .push(file.into());
    }

    /// Candidate files for a point, in indexing order.
    pub fn files(&self, point: &str) -> &[PathBuf] {
        self.entries.get(point).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable access to a point's list.
    pub fn files_mut(&mut self, point: &str) -> Option<&mut Vec<PathBuf>> {
        self.entries.get_mut(point)
    }

    pub fn contains_point(&self, point: &str) -> bool {
        self.entries.contains_key(point)
    }

    /// Iterate over (point name, files) in point-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(name, files)| (name.as_str(), files.as_slice()))
    }

    /// Number of points with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (point, file) pairs.
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

impl From<BTreeMap<String, Vec<PathBuf>>> for CandidateSet {
    fn from(entries: BTreeMap<String, Vec<PathBuf>>) -> Self {
        Self { entries }
    }
}

/// One collocation: the nearest in-radius grid cell of one overpass for one
/// point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// Point name.
    pub point: String,
    /// Overpass file the cell came from.
    pub file: PathBuf,
    pub pixel_lon: f64,
    pub pixel_lat: f64,
    /// Cell timestamp; `None` when the file stores a fill value.
    pub pixel_time: Option<DateTime<Utc>>,
    /// Great-circle distance from the point to the cell.
    pub distance_km: f64,
    /// Grid index of the cell in the full (uncropped) dataset.
    #[serde(skip)]
    pub grid_index: Vec<usize>,
    /// Requested variables found in the file: `Some` when finite, `None`
    /// when the stored value is not. Variables missing from the file have no
    /// key at all.
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl Match {
    /// Value of a variable: `None` if absent from the file,
    /// `Some(None)` if present but non-finite.
    pub fn value(&self, variable: &str) -> Option<Option<f64>> {
        self.values.get(variable).copied()
    }

    /// Ordering used by [`CollocationTable`]: point name, then time (missing
    /// times last), then file.
    pub fn table_order(&self, other: &Self) -> Ordering {
        self.point
            .cmp(&other.point)
            .then_with(|| cmp_time(self.pixel_time, other.pixel_time))
            .then_with(|| self.file.cmp(&other.file))
    }
}

fn cmp_time(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fixed columns of every collocation table.
pub const BASE_COLUMNS: [&str; 6] = [
    "point",
    "file",
    "pixel_lon",
    "pixel_lat",
    "pixel_time",
    "distance_km",
];

/// Whether a name collides with one of [`BASE_COLUMNS`].
///
/// Such a variable would overwrite the fixed column in a flattened record.
pub fn is_base_column(name: &str) -> bool {
    BASE_COLUMNS.contains(&name)
}

/// Collocation results sorted by point name, then matched time.
///
/// The sort is applied on construction, so the order never depends on the
/// order in which matches were produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollocationTable {
    rows: Vec<Match>,
    variables: Vec<String>,
}

impl CollocationTable {
    /// Build a table from matches and the variables that were requested.
    pub fn new(mut rows: Vec<Match>, requested: &[String]) -> Self {
        rows.sort_by(Match::table_order);

        let variables = requested
            .iter()
            .filter(|v| !is_base_column(v))
            .filter(|v| rows.iter().any(|row| row.values.contains_key(v.as_str())))
            .fold(Vec::new(), |mut acc: Vec<String>, v| {
                if !acc.contains(v) {
                    acc.push(v.clone());
                }
                acc
            });

        Self { rows, variables }
    }

    pub fn rows(&self) -> &[Match] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to one point.
    pub fn rows_for<'a>(&'a self, point: &'a str) -> impl Iterator<Item = &'a Match> + 'a {
        self.rows.iter().filter(move |row| row.point == point)
    }

    /// Rows from one overpass file.
    pub fn rows_from<'a>(&'a self, file: &'a Path) -> impl Iterator<Item = &'a Match> + 'a {
        self.rows.iter().filter(move |row| row.file == file)
    }

    /// Column names: the fixed columns plus every requested variable present
    /// in at least one row, in request order.
    pub fn columns(&self) -> Vec<&str> {
        BASE_COLUMNS
            .iter()
            .copied()
            .chain(self.variables.iter().map(String::as_str))
            .collect()
    }

    /// One JSON object per row.
    pub fn to_json_records(&self) -> serde_json::Result<Vec<serde_json::Value>> {
        self.rows.iter().map(serde_json::to_value).collect()
    }
}

impl<'a> IntoIterator for &'a CollocationTable {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Counters for one collocation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollocationStats {
    /// Files listed in the folder.
    pub files_scanned: usize,
    /// Files the indexer could not read.
    pub files_skipped: usize,
    /// (point, file) pairs handed to the matcher.
    pub pairs_attempted: usize,
    /// Pairs that produced a match.
    pub matches: usize,
    /// Pairs with no cell inside the radius.
    pub no_match: usize,
    /// Pairs whose file could not be read.
    pub failures: usize,
}
