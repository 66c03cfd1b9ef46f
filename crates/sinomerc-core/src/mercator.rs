//! Spherical Mercator (EPSG:3857) projection with optional GCJ-02 composition.
use std::f64::consts::PI;

use crate::config::{DatumMode, ProjectionConfig};
use crate::coords::{GeoCoordinate, PlanarBounds, PlanarPoint};
use crate::datum;

/// Sphere radius, meters.
pub const EARTH_RADIUS: f64 = 6378137.0;
/// Latitude at which the projected square closes, degrees.
pub const MAX_LATITUDE: f64 = 85.0511287798;

const HALF_SIZE: f64 = EARTH_RADIUS * PI;
const R2D: f64 = 180.0 / PI;
const D2R: f64 = PI / 180.0;

/// Extent of the projected plane.
pub const BOUNDS: PlanarBounds = PlanarBounds::new(
    PlanarPoint::new(-HALF_SIZE, -HALF_SIZE),
    PlanarPoint::new(HALF_SIZE, HALF_SIZE),
);

/// The projection, with the datum decision bound at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SphericalMercator {
    mode: DatumMode,
}

impl SphericalMercator {
    pub const fn new(mode: DatumMode) -> Self {
        Self { mode }
    }

    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::new(config.datum_mode())
    }

    pub fn mode(&self) -> DatumMode {
        self.mode
    }

    /// WGS-84 → plane. Latitude is clamped to ±[`MAX_LATITUDE`] after the
    /// datum shift, so the poles map to the top and bottom edge.
    pub fn project(&self, coord: GeoCoordinate) -> PlanarPoint {
        let coord = match self.mode {
            DatumMode::Gcj02 => datum::to_gcj02(coord),
            DatumMode::Wgs84 => coord,
        };
        project_raw(coord)
    }

    /// Plane → WGS-84. No clamping on the way back.
    pub fn unproject(&self, point: PlanarPoint) -> GeoCoordinate {
        let coord = unproject_raw(point);
        match self.mode {
            DatumMode::Gcj02 => datum::to_wgs84(coord),
            DatumMode::Wgs84 => coord,
        }
    }

    pub fn bounds(&self) -> PlanarBounds {
        BOUNDS
    }
}

/// Plain spherical Mercator, no datum handling.
pub fn project_raw(coord: GeoCoordinate) -> PlanarPoint {
    let lat = coord.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin = (lat * D2R).sin();
    PlanarPoint::new(
        EARTH_RADIUS * coord.lon * D2R,
        EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
    )
}

/// Inverse of [`project_raw`].
pub fn unproject_raw(point: PlanarPoint) -> GeoCoordinate {
    GeoCoordinate::new(
        point.x * R2D / EARTH_RADIUS,
        (2.0 * (point.y / EARTH_RADIUS).exp().atan() - PI / 2.0) * R2D,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const PLAIN: SphericalMercator = SphericalMercator::new(DatumMode::Wgs84);
    const CHINA: SphericalMercator = SphericalMercator::new(DatumMode::Gcj02);

    #[test]
    fn origin_is_a_fixed_point() {
        assert!(datum::out_of_china(0.0, 0.0));
        for proj in [PLAIN, CHINA] {
            let p = proj.project(GeoCoordinate::new(0.0, 0.0));
            assert_eq!(p, PlanarPoint::new(0.0, 0.0));
        }
    }

    #[test]
    fn latitude_is_clamped() {
        let clamped = PLAIN.project(GeoCoordinate::new(0.0, 89.0));
        let edge = PLAIN.project(GeoCoordinate::new(0.0, MAX_LATITUDE));
        assert_eq!(clamped, edge);
        assert!(clamped.y.is_finite());

        let south = PLAIN.project(GeoCoordinate::new(0.0, -90.0));
        assert_abs_diff_eq!(south.y, -edge.y, epsilon = 1e-6);
    }

    #[test]
    fn max_latitude_maps_to_the_bounds_edge() {
        let edge = PLAIN.project(GeoCoordinate::new(180.0, MAX_LATITUDE));
        assert_abs_diff_eq!(edge.x, BOUNDS.max.x, epsilon = 1e-6);
        assert_abs_diff_eq!(edge.y, BOUNDS.max.y, epsilon = 1e-2);
    }

    #[test]
    fn plain_round_trip() {
        for (lon, lat) in [(7.42, 43.74), (-122.4194, 37.7749), (151.2093, -33.8688), (0.0, 85.0)] {
            let c = GeoCoordinate::new(lon, lat);
            let back = PLAIN.unproject(PLAIN.project(c));
            assert_abs_diff_eq!(back.lon, lon, epsilon = 1e-9);
            assert_abs_diff_eq!(back.lat, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn gcj_mode_shifts_points_in_china_only() {
        let beijing = GeoCoordinate::new(116.3975, 39.9085);
        assert_ne!(CHINA.project(beijing), PLAIN.project(beijing));

        let nyc = GeoCoordinate::new(-73.9857, 40.7484);
        assert_eq!(CHINA.project(nyc), PLAIN.project(nyc));
    }

    #[test]
    fn bounds_span_the_half_circumference() {
        let b = PLAIN.bounds();
        assert_abs_diff_eq!(b.max.x, 20037508.342789244, epsilon = 1e-6);
        assert_eq!(b.min.x, -b.max.x);
        assert_eq!(b.min.y, -b.max.y);
        assert_eq!(CHINA.bounds(), b);
    }

    #[test]
    fn from_config_binds_the_mode() {
        let proj = SphericalMercator::from_config(&ProjectionConfig::new(true));
        assert_eq!(proj.mode(), DatumMode::Gcj02);
        assert_eq!(SphericalMercator::default().mode(), DatumMode::Wgs84);
    }
}
