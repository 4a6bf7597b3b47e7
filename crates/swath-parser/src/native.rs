//! Native NetCDF swath reading using the netcdf library.
//!
//! Reads the `lon`, `lat` and `time` coordinates of a swath file plus any
//! requested data variables. Packed variables are unpacked with their
//! `scale_factor` and `add_offset` attributes, and `_FillValue` cells decode
//! as NaN.
//!
//! Time variables carrying a CF `units` attribute such as
//! `"seconds since 2000-01-01 00:00:00.0"` are rebased onto the Unix epoch.
//!
//! The netcdf `File` handle is owned by the reading function and closed on
//! drop, so every exit path (success, missing variable, read error) releases
//! it.

use std::path::{Path, PathBuf};
use std::sync::Once;

use chrono::{NaiveDate, NaiveDateTime};
use ndarray::{ArrayD, IxDyn};
use tracing::debug;

use crate::dataset::{GridDataset, GridExtent};
use crate::error::{SwathError, SwathResult};
use crate::source::{list_files_with_extension, SwathSource};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully (e.g., when checking for optional attributes that
/// don't exist). This disables that output by calling H5Eset_auto2 with null
/// handlers. Safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Reads swath granules stored as NetCDF-4 files.
#[derive(Debug, Clone)]
pub struct NetCdfSwathSource {
    extension: String,
    lon_name: String,
    lat_name: String,
    time_name: String,
}

impl Default for NetCdfSwathSource {
    fn default() -> Self {
        Self {
            extension: "nc".to_string(),
            lon_name: "lon".to_string(),
            lat_name: "lat".to_string(),
            time_name: "time".to_string(),
        }
    }
}

impl NetCdfSwathSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the coordinate variable names.
    pub fn with_coordinate_names(
        mut self,
        lon: impl Into<String>,
        lat: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        self.lon_name = lon.into();
        self.lat_name = lat.into();
        self.time_name = time.into();
        self
    }

    fn open_file(&self, file: &Path) -> SwathResult<netcdf::File> {
        silence_hdf5_errors();
        netcdf::open(file).map_err(|e| SwathError::NetCdf(format!("Failed to open NetCDF: {}", e)))
    }
}

impl SwathSource for NetCdfSwathSource {
    fn list_files(&self, folder: &Path) -> SwathResult<Vec<PathBuf>> {
        list_files_with_extension(folder, &self.extension)
    }

    fn extent(&self, file: &Path) -> SwathResult<Option<GridExtent>> {
        let nc_file = self.open_file(file)?;
        let lon = read_unpacked(&required_variable(&nc_file, &self.lon_name)?)?;
        let lat = read_unpacked(&required_variable(&nc_file, &self.lat_name)?)?;
        Ok(GridExtent::from_coordinates(lon.view(), lat.view()))
    }

    fn open(&self, file: &Path, variables: &[String]) -> SwathResult<GridDataset> {
        let nc_file = self.open_file(file)?;

        let lon = read_unpacked(&required_variable(&nc_file, &self.lon_name)?)?;
        let lat = read_unpacked(&required_variable(&nc_file, &self.lat_name)?)?;

        let time_var = required_variable(&nc_file, &self.time_name)?;
        let mut time = read_unpacked(&time_var)?;
        if let Some(epoch_offset) = get_string_attr(&time_var, "units")
            .as_deref()
            .and_then(unix_offset_seconds)
        {
            time.mapv_inplace(|t| t + epoch_offset);
        }

        let mut dataset = GridDataset::new(lon, lat, time)?;

        for name in variables {
            let Some(var) = nc_file.variable(name) else {
                debug!(file = %file.display(), variable = %name, "Variable not present");
                continue;
            };
            dataset.insert_variable(name.clone(), read_unpacked(&var)?)?;
        }

        Ok(dataset)
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn required_variable<'f>(nc_file: &'f netcdf::File, name: &str) -> SwathResult<netcdf::Variable<'f>> {
    nc_file
        .variable(name)
        .ok_or_else(|| SwathError::MissingData(format!("{} variable", name)))
}

/// Read a variable as f64, applying packing attributes and fill values.
fn read_unpacked(var: &netcdf::Variable) -> SwathResult<ArrayD<f64>> {
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

    let raw = read_raw(var)?;

    let scale_factor = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);
    let fill_value = get_f64_attr(var, "_FillValue");

    let data: Vec<f64> = raw
        .into_iter()
        .map(|val| {
            if !val.is_finite() || Some(val) == fill_value {
                f64::NAN
            } else {
                val * scale_factor + add_offset
            }
        })
        .collect();

    let found = data.len();
    ArrayD::from_shape_vec(IxDyn(&shape), data)
        .map_err(|_| SwathError::shape_mismatch(var.name(), &shape, &[found]))
}

/// Read raw values widened to f64, trying the common stored types in turn.
fn read_raw(var: &netcdf::Variable) -> SwathResult<Vec<f64>> {
    if let Ok(raw) = var.get_values::<f64, _>(..) {
        return Ok(raw);
    }
    if let Ok(raw) = var.get_values::<f32, _>(..) {
        return Ok(raw.into_iter().map(f64::from).collect());
    }
    if let Ok(raw) = var.get_values::<i32, _>(..) {
        return Ok(raw.into_iter().map(f64::from).collect());
    }
    var.get_values::<i16, _>(..)
        .map(|raw| raw.into_iter().map(f64::from).collect())
        .map_err(|e| SwathError::NetCdf(format!("Failed to read {}: {}", var.name(), e)))
}

/// Offset in seconds to add to a CF time value to get Unix seconds.
///
/// Only `seconds since <date>[ <time>]` units are understood.
fn unix_offset_seconds(units: &str) -> Option<f64> {
    let reference = units.trim().strip_prefix("seconds since")?.trim();
    let reference = reference.trim_end_matches('Z');

    let parsed = NaiveDateTime::parse_from_str(reference, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(reference, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(reference, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    Some(parsed.and_utc().timestamp() as f64)
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
