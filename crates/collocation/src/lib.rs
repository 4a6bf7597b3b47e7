//! Collocation of point observations against satellite swath grids.
//!
//! Pairs stationary points (buoys, tide gauges) with the nearest grid cell
//! of each overpass file that lies within a search radius. Swath grids are
//! irregular, so the join runs in two stages:
//!
//! ```text
//! folder of overpass files
//!      │
//!      ▼
//! index_candidates()          extent only, padded by R/111 degrees
//!      │
//!      ▼
//! CandidateSet                point name -> [file, ...]
//!      │
//!      ▼
//! collocate_all()
//!      │
//!      ├─► match_one() per (point, file)
//!      │       ├─► crop to the degree box
//!      │       ├─► haversine distance per cell
//!      │       └─► nearest cell with distance <= R
//!      │
//!      └─► sort by point name, then matched time
//!               │
//!               ▼
//!          CollocationTable
//! ```
//!
//! # Limitations
//!
//! - The degree padding `R / 111` ignores the shrinking of longitude degrees
//!   towards the poles.
//! - The degree box compares longitudes linearly, so a swath and a point on
//!   opposite sides of the antimeridian never match even when the haversine
//!   distance between them is small.
//!
//! # Example
//!
//! ```ignore
//! use collocation::{CollocationConfig, CollocationService, Point};
//! use swath_parser::JsonSwathSource;
//!
//! let config = CollocationConfig::default().with_variables(["ssh_karin"]);
//! let service = CollocationService::new(JsonSwathSource::new(), config)?;
//!
//! let points = vec![Point::new("46050", -124.5, 44.6)];
//! let report = service.run("granules/".as_ref(), &points)?;
//! for row in report.table.rows() {
//!     println!("{} {:.2} km", row.point, row.distance_km);
//! }
//! ```

pub mod config;
pub mod distance;
pub mod error;
pub mod index;
pub mod matcher;
pub mod service;
pub mod types;

// Re-export commonly used types at crate root
pub use config::CollocationConfig;
pub use distance::{degree_padding, haversine_grid_km, haversine_km, EARTH_RADIUS_KM, KM_PER_DEGREE};
pub use error::{CollocationError, Result};
pub use index::{index_candidates, index_folder, IndexReport};
pub use matcher::{match_in_dataset, match_one};
pub use service::{collocate_all, collocate_all_parallel, CollocationReport, CollocationService};
pub use types::{CandidateSet, CollocationStats, CollocationTable, Match, Point};
