//! Synthetic swath generators.
//!
//! These build small [`GridDataset`]s with predictable geometry so tests can
//! reason about which cell a point should match.

use ndarray::{Array1, Array2};
use swath_parser::GridDataset;

use crate::fixtures::time::REFERENCE_EPOCH;

/// Geometry of a synthetic swath.
#[derive(Debug, Clone, Copy)]
pub struct SwathSpec {
    pub center_lon: f64,
    pub center_lat: f64,
    /// Number of scan lines (outer axis).
    pub lines: usize,
    /// Number of pixels per line (inner axis).
    pub pixels: usize,
    /// Cell spacing in degrees.
    pub spacing_deg: f64,
    /// Track heading in degrees clockwise from north.
    pub heading_deg: f64,
    /// Time of the first scan line, seconds since the Unix epoch.
    pub start_time: f64,
    /// Seconds between scan lines.
    pub line_interval_s: f64,
}

impl SwathSpec {
    /// A 20x10 swath with 0.02° cells, slightly rotated, centered on a point.
    pub fn centered_on(center_lon: f64, center_lat: f64) -> Self {
        Self {
            center_lon,
            center_lat,
            lines: 20,
            pixels: 10,
            spacing_deg: 0.02,
            heading_deg: 12.0,
            start_time: REFERENCE_EPOCH,
            line_interval_s: 1.0,
        }
    }

    pub fn with_size(mut self, lines: usize, pixels: usize) -> Self {
        self.lines = lines;
        self.pixels = pixels;
        self
    }

    pub fn with_spacing(mut self, spacing_deg: f64) -> Self {
        self.spacing_deg = spacing_deg;
        self
    }

    pub fn with_heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = heading_deg;
        self
    }

    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }
}

/// Creates an irregular, rotated swath.
///
/// Coordinates follow the rotated lattice plus a small deterministic wobble
/// so the grid is not rectilinear. Time is one value per scan line. Two
/// variables are attached:
///
/// - `ssh_karin`: smooth, always finite
/// - `swh_karin`: NaN on every seventh cell (flat index % 7 == 3)
pub fn create_swath(spec: &SwathSpec) -> GridDataset {
    let (lines, pixels) = (spec.lines, spec.pixels);
    let heading = spec.heading_deg.to_radians();
    let mid_line = (lines as f64 - 1.0) / 2.0;
    let mid_pixel = (pixels as f64 - 1.0) / 2.0;

    let mut lon = Array2::<f64>::zeros((lines, pixels));
    let mut lat = Array2::<f64>::zeros((lines, pixels));
    let mut ssh = Array2::<f64>::zeros((lines, pixels));
    let mut swh = Array2::<f64>::zeros((lines, pixels));

    for r in 0..lines {
        for c in 0..pixels {
            let along = (r as f64 - mid_line) * spec.spacing_deg;
            let across = (c as f64 - mid_pixel) * spec.spacing_deg;
            let wobble = 0.05 * spec.spacing_deg * (r as f64 * 1.3 + c as f64 * 0.7).sin();

            let x = spec.center_lon + across * heading.cos() + along * heading.sin() + wobble;
            let y = spec.center_lat - across * heading.sin() + along * heading.cos() - wobble;

            lon[[r, c]] = x;
            lat[[r, c]] = y;
            ssh[[r, c]] = 0.1 * x.to_radians().sin() + 0.05 * y.to_radians().cos();
            swh[[r, c]] = if (r * pixels + c) % 7 == 3 {
                f64::NAN
            } else {
                1.5 + 0.01 * r as f64
            };
        }
    }

    let time = Array1::from_shape_fn(lines, |r| spec.start_time + r as f64 * spec.line_interval_s);

    GridDataset::new(lon.into_dyn(), lat.into_dyn(), time.into_dyn())
        .and_then(|ds| ds.with_variable("ssh_karin", ssh.into_dyn()))
        .and_then(|ds| ds.with_variable("swh_karin", swh.into_dyn()))
        .expect("synthetic swath has consistent shapes")
}

/// Creates an axis-aligned grid starting at (`min_lon`, `min_lat`).
///
/// Cell `(r, c)` sits at `(min_lon + c * step, min_lat + r * step)` and
/// carries time `start_time + r`. No variables are attached.
pub fn create_regular_swath(
    min_lon: f64,
    min_lat: f64,
    lines: usize,
    pixels: usize,
    step: f64,
    start_time: f64,
) -> GridDataset {
    let lon = Array2::from_shape_fn((lines, pixels), |(_, c)| min_lon + c as f64 * step);
    let lat = Array2::from_shape_fn((lines, pixels), |(r, _)| min_lat + r as f64 * step);
    let time = Array1::from_shape_fn(lines, |r| start_time + r as f64);

    GridDataset::new(lon.into_dyn(), lat.into_dyn(), time.into_dyn())
        .expect("regular swath has consistent shapes")
}

/// Creates a 2x2 swath whose corners span exactly the given extent.
pub fn create_swath_with_extent(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> GridDataset {
    let lon = Array2::from_shape_vec((2, 2), vec![min_lon, max_lon, min_lon, max_lon])
        .expect("2x2 shape");
    let lat = Array2::from_shape_vec((2, 2), vec![min_lat, min_lat, max_lat, max_lat])
        .expect("2x2 shape");
    let time = Array1::from_elem(2, REFERENCE_EPOCH);

    GridDataset::new(lon.into_dyn(), lat.into_dyn(), time.into_dyn())
        .expect("2x2 swath has consistent shapes")
}
