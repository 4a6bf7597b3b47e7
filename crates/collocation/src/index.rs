//! Bounding-box prefilter over a folder of overpass files.
//!
//! Only each file's coordinate extent is read. A file becomes a candidate for
//! a point when the point lies inside the extent padded by
//! [`degree_padding`](crate::distance::degree_padding) on every side.

use std::path::Path;

use swath_parser::SwathSource;
use tracing::{debug, info, warn};

use crate::distance::degree_padding;
use crate::error::{CollocationError, Result};
use crate::types::{validate_points, validate_radius, CandidateSet, Point};

/// Outcome of indexing a folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexReport {
    pub candidates: CandidateSet,
    /// Files listed in the folder.
    pub files_scanned: usize,
    /// Files that could not be read and were left out.
    pub files_skipped: usize,
}

/// Build the per-point candidate file lists for a folder.
///
/// Files are visited in sorted file-name order, so each point's list is
/// sorted too. A file that cannot be read is logged and skipped; only a
/// failure to list the folder itself is returned as an error.
pub fn index_candidates<S: SwathSource + ?Sized>(
    source: &S,
    folder: &Path,
    points: &[Point],
    radius_km: f64,
) -> Result<CandidateSet> {
    index_folder(source, folder, points, radius_km).map(|report| report.candidates)
}

/// Like [`index_candidates`], also reporting how many files were skipped.
pub fn index_folder<S: SwathSource + ?Sized>(
    source: &S,
    folder: &Path,
    points: &[Point],
    radius_km: f64,
) -> Result<IndexReport> {
    validate_points(points)?;
    validate_radius(radius_km)?;

    let files = source
        .list_files(folder)
        .map_err(|e| CollocationError::data_access(folder, e))?;

    let pad = degree_padding(radius_km);
    let mut candidates = CandidateSet::for_points(points);
    let mut files_skipped = 0;

    for file in &files {
        let extent = match source.extent(file) {
            Ok(Some(extent)) => extent,
            Ok(None) => {
                debug!(file = %file.display(), "No finite coordinates, skipping");
                continue;
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "Skipping unreadable overpass file");
                files_skipped += 1;
                continue;
            }
        };

        let padded = extent.expand(pad);
        let mut hits = 0;
        for point in points {
            if padded.contains(point.lon, point.lat) {
                candidates.push(&point.name, file.clone());
                hits += 1;
            }
        }

        debug!(
            file = %file.display(),
            min_lon = extent.min_lon,
            max_lon = extent.max_lon,
            min_lat = extent.min_lat,
            max_lat = extent.max_lat,
            points = hits,
            "Indexed overpass file"
        );
    }

    info!(
        folder = %folder.display(),
        files = files.len(),
        skipped = files_skipped,
        pairs = candidates.pair_count(),
        "Candidate index built"
    );

    Ok(IndexReport {
        candidates,
        files_scanned: files.len(),
        files_skipped,
    })
}
