//! Data access for irregular satellite swath grids.
//!
//! This crate reads overpass files (one instrument pass per file) into
//! [`GridDataset`]s: co-indexed longitude, latitude and time arrays plus named
//! numeric variables sharing one grid shape. Swath grids come from scanning
//! instruments and are not aligned to a regular lon/lat grid, so nothing here
//! assumes rectilinear coordinates.
//!
//! # Sources
//!
//! - [`JsonSwathSource`] reads `*.json` swath documents (always available).
//! - `NetCdfSwathSource` reads `*.nc` granules such as SWOT KaRIn L2 products
//!   (requires the `netcdf` feature and libnetcdf/HDF5 on the host).
//!
//! Both implement [`SwathSource`], which is what the collocation engine
//! consumes.

pub mod dataset;
pub mod error;
pub mod json;
#[cfg(feature = "netcdf")]
pub mod native;
pub mod source;

pub use dataset::{GridDataset, GridExtent};
pub use error::{SwathError, SwathResult};
pub use json::{JsonSwathSource, SwathDocument};
#[cfg(feature = "netcdf")]
pub use native::{silence_hdf5_errors, NetCdfSwathSource};
pub use source::{list_files_with_extension, SwathSource};
