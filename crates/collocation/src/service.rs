//! Collocation across every point and every candidate overpass.
//!
//! [`collocate_all`] drives the matcher once per (point, file) pair and
//! returns a [`CollocationTable`] sorted by point name then matched time.
//! [`CollocationService`] bundles a data source with a
//! [`CollocationConfig`] and runs indexing and matching together.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use swath_parser::SwathSource;
use tracing::{debug, info, warn};

use crate::config::CollocationConfig;
use crate::error::{CollocationError, Result};
use crate::index::index_folder;
use crate::matcher::match_one;
use crate::types::{CandidateSet, CollocationStats, CollocationTable, Match, Point};

/// Collocate every point against its candidate files, sequentially.
///
/// Files that cannot be read are logged and skipped. Points without any
/// in-radius cell contribute no rows.
pub fn collocate_all<S: SwathSource + ?Sized>(
    source: &S,
    candidates: &CandidateSet,
    points: &[Point],
    radius_km: f64,
    variables: &[String],
) -> CollocationTable {
    collocate_pairs(source, candidates, points, radius_km, variables, false).0
}

/// Like [`collocate_all`], matching pairs on the rayon thread pool.
///
/// The returned table is identical to the sequential one.
pub fn collocate_all_parallel<S: SwathSource + ?Sized>(
    source: &S,
    candidates: &CandidateSet,
    points: &[Point],
    radius_km: f64,
    variables: &[String],
) -> CollocationTable {
    collocate_pairs(source, candidates, points, radius_km, variables, true).0
}

/// Outcome of matching a single (point, file) pair.
enum PairOutcome {
    Matched(Match),
    NoMatch,
    Failed,
}

fn collocate_pairs<S: SwathSource + ?Sized>(
    source: &S,
    candidates: &CandidateSet,
    points: &[Point],
    radius_km: f64,
    variables: &[String],
    parallel: bool,
) -> (CollocationTable, CollocationStats) {
    for (name, _) in candidates.iter() {
        if !points.iter().any(|p| p.name == name) {
            debug!(point = %name, "Candidate entry has no matching point, ignoring");
        }
    }

    let pairs: Vec<(&Point, &PathBuf)> = points
        .iter()
        .flat_map(|point| {
            candidates
                .files(&point.name)
                .iter()
                .map(move |file| (point, file))
        })
        .collect();

    let run_pair = |&(point, file): &(&Point, &PathBuf)| -> PairOutcome {
        match match_one(source, file, point, radius_km, variables) {
            Ok(Some(found)) => PairOutcome::Matched(found),
            Ok(None) => PairOutcome::NoMatch,
            Err(e) => {
                warn!(
                    point = %point.name,
                    file = %file.display(),
                    error = %e,
                    "Skipping pair after read failure"
                );
                PairOutcome::Failed
            }
        }
    };

    let outcomes: Vec<PairOutcome> = if parallel {
        pairs.par_iter().map(run_pair).collect()
    } else {
        pairs.iter().map(run_pair).collect()
    };

    let mut stats = CollocationStats {
        pairs_attempted: pairs.len(),
        ..Default::default()
    };
    let mut rows = Vec::new();
    for outcome in outcomes {
        match outcome {
            PairOutcome::Matched(found) => {
                stats.matches += 1;
                rows.push(found);
            }
            PairOutcome::NoMatch => stats.no_match += 1,
            PairOutcome::Failed => stats.failures += 1,
        }
    }

    // Sorting happens here, after every worker is done, so the row order
    // never depends on scheduling.
    (CollocationTable::new(rows, variables), stats)
}

/// Table and counters from a full run.
#[derive(Debug, Clone)]
pub struct CollocationReport {
    pub table: CollocationTable,
    pub stats: CollocationStats,
}

/// Collocation service with an explicit configuration.
///
/// Holds no state besides the source and configuration; every call takes
/// the folder and points it operates on.
pub struct CollocationService<S: SwathSource> {
    source: S,
    config: CollocationConfig,
}

impl<S: SwathSource> CollocationService<S> {
    /// Create a service, validating the configuration.
    pub fn new(source: S, config: CollocationConfig) -> Result<Self> {
        config.validate().map_err(CollocationError::ConfigError)?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &CollocationConfig {
        &self.config
    }

    /// Build the candidate set for a folder.
    pub fn index(&self, folder: &Path, points: &[Point]) -> Result<CandidateSet> {
        index_folder(&self.source, folder, points, self.config.radius_km)
            .map(|report| report.candidates)
    }

    /// Match one point against one file.
    pub fn match_one(&self, file: &Path, point: &Point) -> Result<Option<Match>> {
        match_one(
            &self.source,
            file,
            point,
            self.config.radius_km,
            &self.config.variables,
        )
    }

    /// Collocate every point against its candidates.
    pub fn collocate(&self, candidates: &CandidateSet, points: &[Point]) -> CollocationReport {
        let (table, stats) = collocate_pairs(
            &self.source,
            candidates,
            points,
            self.config.radius_km,
            &self.config.variables,
            self.config.parallel,
        );
        CollocationReport { table, stats }
    }

    /// Index a folder and collocate every point against it.
    pub fn run(&self, folder: &Path, points: &[Point]) -> Result<CollocationReport> {
        let index = index_folder(&self.source, folder, points, self.config.radius_km)?;
        let mut report = self.collocate(&index.candidates, points);
        report.stats.files_scanned = index.files_scanned;
        report.stats.files_skipped = index.files_skipped;

        info!(
            folder = %folder.display(),
            points = points.len(),
            files = report.stats.files_scanned,
            pairs = report.stats.pairs_attempted,
            matches = report.stats.matches,
            failures = report.stats.failures,
            "Collocation finished"
        );

        Ok(report)
    }
}
