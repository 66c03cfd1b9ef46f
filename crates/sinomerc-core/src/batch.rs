//! Slice-at-a-time conversions for callers placing many points at once.
//! Runs on the rayon pool when the `threading` feature is on; output order
//! always matches input order.
#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::coords::{GeoCoordinate, PlanarPoint};
use crate::datum;
use crate::mercator::SphericalMercator;

#[cfg(feature = "threading")]
fn map_all<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    T: Copy + Sync,
    U: Send,
    F: Fn(T) -> U + Sync + Send,
{
    items.par_iter().map(|&item| f(item)).collect()
}

#[cfg(not(feature = "threading"))]
fn map_all<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    F: Fn(T) -> U,
    T: Copy,
{
    items.iter().map(|&item| f(item)).collect()
}

pub fn project_all(projection: &SphericalMercator, coords: &[GeoCoordinate]) -> Vec<PlanarPoint> {
    map_all(coords, |c| projection.project(c))
}

pub fn unproject_all(projection: &SphericalMercator, points: &[PlanarPoint]) -> Vec<GeoCoordinate> {
    map_all(points, |p| projection.unproject(p))
}

pub fn to_gcj02_all(coords: &[GeoCoordinate]) -> Vec<GeoCoordinate> {
    map_all(coords, datum::to_gcj02)
}

pub fn to_wgs84_all(coords: &[GeoCoordinate]) -> Vec<GeoCoordinate> {
    map_all(coords, datum::to_wgs84)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatumMode;

    fn grid() -> Vec<GeoCoordinate> {
        (0..12)
            .flat_map(|i| (0..8).map(move |j| GeoCoordinate::new(70.0 + i as f64 * 6.0, j as f64 * 7.5)))
            .collect()
    }

    #[test]
    fn batch_matches_single_point_calls_in_order() {
        let proj = SphericalMercator::new(DatumMode::Gcj02);
        let coords = grid();

        let planar = project_all(&proj, &coords);
        assert_eq!(planar.len(), coords.len());
        for (c, p) in coords.iter().zip(&planar) {
            assert_eq!(proj.project(*c), *p);
        }

        let back = unproject_all(&proj, &planar);
        for (c, b) in coords.iter().zip(&back) {
            assert!(c.max_abs_diff(*b) < 1e-6, "{c:?} came back as {b:?}");
        }
    }

    #[test]
    fn datum_batch_round_trips() {
        let coords = grid();
        let gcj = to_gcj02_all(&coords);
        let wgs = to_wgs84_all(&gcj);
        for (c, w) in coords.iter().zip(&wgs) {
            assert!(c.max_abs_diff(*w) < 1e-6);
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(to_gcj02_all(&[]).is_empty());
        assert!(project_all(&SphericalMercator::default(), &[]).is_empty());
    }
}
