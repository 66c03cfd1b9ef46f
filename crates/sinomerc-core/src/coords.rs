//! Geographic and planar coordinate types.
//! All coordinate math uses f64; nothing here normalizes or validates input.
use serde::{Deserialize, Serialize};

/// A point in geographic coordinates, in decimal degrees.
///
/// The same type carries WGS-84 and GCJ-02 values; which datum a value is in
/// is decided by where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Longitude in degrees, -180 to +180.
    #[serde(alias = "lng", alias = "longitude")]
    pub lon: f64,
    /// Latitude in degrees, -90 to +90.
    #[serde(alias = "latitude")]
    pub lat: f64,
}

impl GeoCoordinate {
    /// Longitude first, matching the (x, y) order of the plane.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Largest absolute per-axis difference, in degrees.
    pub fn max_abs_diff(self, other: Self) -> f64 {
        (self.lon - other.lon).abs().max((self.lat - other.lat).abs())
    }
}

impl From<(f64, f64)> for GeoCoordinate {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

impl From<GeoCoordinate> for (f64, f64) {
    fn from(c: GeoCoordinate) -> Self {
        (c.lon, c.lat)
    }
}

/// A point on the Spherical Mercator plane, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for PlanarPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<PlanarPoint> for (f64, f64) {
    fn from(p: PlanarPoint) -> Self {
        (p.x, p.y)
    }
}

/// Axis-aligned rectangle on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarBounds {
    pub min: PlanarPoint,
    pub max: PlanarPoint,
}

impl PlanarBounds {
    pub const fn new(min: PlanarPoint, max: PlanarPoint) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, p: PlanarPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn clamp(&self, p: PlanarPoint) -> PlanarPoint {
        PlanarPoint::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }
}
