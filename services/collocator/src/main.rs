//! Swath collocator.
//!
//! Scans a folder of satellite overpass files and writes, for every point,
//! the nearest grid cell of each overpass that lies within the search radius.

mod config;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use collocation::{CollocationService, Point};
use swath_parser::{JsonSwathSource, SwathSource};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use config::{load_run_config, parse_point_arg, Overrides, RunConfig, RunPlan};

/// On-disk format of the overpass files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceFormat {
    /// JSON swath documents (*.json)
    Json,
    /// NetCDF granules (*.nc), needs the `netcdf` feature
    Netcdf,
}

#[derive(Parser, Debug)]
#[command(name = "collocator")]
#[command(about = "Collocate point observations with satellite swath files")]
struct Args {
    /// Run file (YAML) with folder, points and collocation settings
    #[arg(short, long, env = "COLLOCATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Folder of overpass files
    #[arg(short, long)]
    folder: Option<PathBuf>,

    /// Point as NAME,LON,LAT (repeatable)
    #[arg(short, long = "point", value_parser = parse_point_arg)]
    points: Vec<Point>,

    /// Search radius in kilometers
    #[arg(short, long)]
    radius_km: Option<f64>,

    /// Comma-separated variables to extract
    #[arg(long, value_delimiter = ',')]
    variables: Option<Vec<String>>,

    /// Match (point, file) pairs in parallel
    #[arg(long)]
    parallel: bool,

    /// Format of the overpass files
    #[arg(long, value_enum, default_value_t = SourceFormat::Json)]
    format: SourceFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Log as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json);

    let run = match &args.config {
        Some(path) => load_run_config(path)?,
        None => RunConfig::default(),
    };
    let plan = run.apply(Overrides {
        folder: args.folder.clone(),
        points: args.points.clone(),
        radius_km: args.radius_km,
        variables: args.variables.clone(),
        parallel: args.parallel,
    })?;

    info!(
        folder = %plan.folder.display(),
        points = plan.points.len(),
        radius_km = plan.config.radius_km,
        variables = ?plan.config.variables,
        format = ?args.format,
        "Starting collocation"
    );

    match args.format {
        SourceFormat::Json => run_with(JsonSwathSource::new(), plan, &args),
        SourceFormat::Netcdf => run_netcdf(plan, &args),
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // stdout carries the table, so logs go to stderr
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_with<S: SwathSource>(source: S, plan: RunPlan, args: &Args) -> Result<()> {
    let service = CollocationService::new(source, plan.config)?;
    let report = service.run(&plan.folder, &plan.points)?;

    info!(
        rows = report.table.len(),
        files_scanned = report.stats.files_scanned,
        files_skipped = report.stats.files_skipped,
        failures = report.stats.failures,
        "Writing collocation table"
    );

    output::write_table(&report.table, args.output.as_deref())
}

#[cfg(feature = "netcdf")]
fn run_netcdf(plan: RunPlan, args: &Args) -> Result<()> {
    swath_parser::silence_hdf5_errors();
    run_with(swath_parser::NetCdfSwathSource::new(), plan, args)
}

#[cfg(not(feature = "netcdf"))]
fn run_netcdf(_plan: RunPlan, _args: &Args) -> Result<()> {
    anyhow::bail!("NetCDF input requires building collocator with the `netcdf` feature")
}
