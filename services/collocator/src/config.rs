//! Run file loading for the collocator.
//!
//! A run file is YAML naming the folder to scan, the points to collocate and
//! optionally the collocation settings:
//!
//! ```yaml
//! folder: ${SWOT_DATA_DIR:-/data/swot}
//! points:
//!   - { name: "46050", lon: -124.546, lat: 44.669 }
//!   - { name: "46029", lon: -124.485, lat: 46.163 }
//! collocation:
//!   radius_km: 25
//!   variables: [ssh_karin, swh_karin]
//! ```
//!
//! `${VAR}` and `${VAR:-default}` are substituted from the environment before
//! parsing. Command-line flags override anything in the file.

use anyhow::{Context, Result};
use collocation::{CollocationConfig, Point};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a run file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub folder: Option<PathBuf>,

    #[serde(default)]
    pub points: Vec<Point>,

    /// Falls back to `CollocationConfig::from_env` when absent.
    #[serde(default)]
    pub collocation: Option<CollocationConfig>,
}

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub folder: Option<PathBuf>,
    pub points: Vec<Point>,
    pub radius_km: Option<f64>,
    pub variables: Option<Vec<String>>,
    pub parallel: bool,
}

/// Everything a run needs, after merging the run file with the flags.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub folder: PathBuf,
    pub points: Vec<Point>,
    pub config: CollocationConfig,
}

impl RunConfig {
    /// Merge command-line overrides into this run file.
    ///
    /// Points given on the command line are appended after the file's points.
    pub fn apply(self, overrides: Overrides) -> Result<RunPlan> {
        let folder = overrides
            .folder
            .or(self.folder)
            .context("No folder given: set `folder` in the run file or pass --folder")?;

        let mut points = self.points;
        points.extend(overrides.points);
        if points.is_empty() {
            anyhow::bail!("No points given: add `points` to the run file or pass --point");
        }

        let mut config = self.collocation.unwrap_or_else(CollocationConfig::from_env);
        if let Some(radius_km) = overrides.radius_km {
            config.radius_km = radius_km;
        }
        if let Some(variables) = overrides.variables {
            config.variables = variables;
        }
        if overrides.parallel {
            config.parallel = true;
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid collocation settings: {}", e))?;

        Ok(RunPlan {
            folder,
            points,
            config,
        })
    }
}

/// Load and parse a run file with environment variable substitution.
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read run file from {:?}", path.as_ref()))?;

    let expanded = expand_env_vars(&content)?;

    serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse run file {:?}", path.as_ref()))
}

/// Parse a `NAME,LON,LAT` point argument.
pub fn parse_point_arg(s: &str) -> Result<Point, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [name, lon, lat] = parts.as_slice() else {
        return Err(format!("expected NAME,LON,LAT, got '{}'", s));
    };

    if name.is_empty() {
        return Err("point name must not be empty".to_string());
    }
    let lon: f64 = lon
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat))?;

    Ok(Point::new(*name, lon, lat))
}

/// Expand `${VAR}` and `${VAR:-default}` in YAML content.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
