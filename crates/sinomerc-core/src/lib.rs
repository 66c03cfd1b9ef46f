//! WGS-84 / GCJ-02 datum transform and Spherical Mercator projection for web
//! maps of mainland China.
//!
//! ```
//! use sinomerc_core::{DatumMode, GeoCoordinate, SphericalMercator};
//!
//! let proj = SphericalMercator::new(DatumMode::Gcj02);
//! let beijing = GeoCoordinate::new(116.3975, 39.9085);
//! let back = proj.unproject(proj.project(beijing));
//! assert!(back.max_abs_diff(beijing) < 1e-6);
//! ```

pub mod batch;
pub mod config;
pub mod coords;
pub mod datum;
pub mod error;
pub mod mercator;

pub use config::{DatumMode, ProjectionConfig};
pub use coords::{GeoCoordinate, PlanarBounds, PlanarPoint};
pub use datum::{out_of_china, solve_wgs84, to_gcj02, to_wgs84, to_wgs84_checked, InverseSolution};
pub use error::{ConfigError, DatumError};
pub use mercator::{SphericalMercator, EARTH_RADIUS, MAX_LATITUDE};
