//! WGS-84 ↔ GCJ-02 datum transform.
//!
//! The forward shift is closed form; the inverse has no closed form and is
//! recovered by Newton iteration (see [`solver`]). Everything here is pure.

pub mod series;
pub mod solver;

use std::f64::consts::PI;

use crate::coords::GeoCoordinate;
use series::{LAT_SERIES, LON_SERIES};

pub use solver::{solve_wgs84, to_wgs84, to_wgs84_checked, InverseSolution};

/// Semi-major axis of the Krasovsky 1940 ellipsoid used by GCJ-02, meters.
pub const SEMI_MAJOR_AXIS: f64 = 6378245.0;
/// First eccentricity squared of the same ellipsoid.
pub const ECCENTRICITY_SQ: f64 = 0.00669342162296594323;

/// Origin of the local frame the offset series are evaluated in.
pub const FRAME_ORIGIN_LON: f64 = 105.0;
pub const FRAME_ORIGIN_LAT: f64 = 35.0;

/// Box outside of which the two datums coincide.
pub const CHINA_MIN_LON: f64 = 72.004;
pub const CHINA_MAX_LON: f64 = 137.8347;
pub const CHINA_MIN_LAT: f64 = 0.8293;
pub const CHINA_MAX_LAT: f64 = 55.8271;

/// True when (lat, lon) lies outside the China box. Edges count as inside.
///
/// NaN compares false on every edge and is therefore treated as inside, so it
/// flows through the series and comes out as NaN.
pub fn out_of_china(lat: f64, lon: f64) -> bool {
    if lon < CHINA_MIN_LON || lon > CHINA_MAX_LON {
        return true;
    }
    lat < CHINA_MIN_LAT || lat > CHINA_MAX_LAT
}

/// WGS-84 → GCJ-02. Returns the input bit-for-bit outside the China box.
pub fn to_gcj02(coord: GeoCoordinate) -> GeoCoordinate {
    let GeoCoordinate { lon, lat } = coord;
    if out_of_china(lat, lon) {
        return coord;
    }
    let (x, y) = (lon - FRAME_ORIGIN_LON, lat - FRAME_ORIGIN_LAT);
    let d_lat = LAT_SERIES.value(x, y);
    let d_lon = LON_SERIES.value(x, y);

    // Scale the raw offsets by the ellipsoid's local radii of curvature.
    let rad_lat = lat / 180.0 * PI;
    let magic = 1.0 - ECCENTRICITY_SQ * rad_lat.sin().powi(2);
    let sqrt_magic = magic.sqrt();
    let d_lat = (d_lat * 180.0)
        / ((SEMI_MAJOR_AXIS * (1.0 - ECCENTRICITY_SQ)) / (magic * sqrt_magic) * PI);
    let d_lon = (d_lon * 180.0) / (SEMI_MAJOR_AXIS / sqrt_magic * rad_lat.cos() * PI);

    GeoCoordinate::new(lon + d_lon, lat + d_lat)
}
