//! GCJ-02 → WGS-84 by Newton–Raphson on the forward shift.
//!
//! Solves `to_gcj02(wgs) = gcj` for `wgs`, starting from `wgs = gcj`. The
//! Jacobian is analytic: the series partials from [`super::series`] chained
//! through the ellipsoid scaling that [`super::to_gcj02`] applies.
//!
//! Termination is guaranteed by [`MAX_ITERATIONS`]. Each step is also stopped
//! early when the 2×2 system is singular or produces a non-finite step.
use std::f64::consts::PI;

use super::series::{LAT_SERIES, LON_SERIES};
use super::{
    out_of_china, to_gcj02, ECCENTRICITY_SQ, FRAME_ORIGIN_LAT, FRAME_ORIGIN_LON,
    SEMI_MAJOR_AXIS,
};
use crate::coords::GeoCoordinate;
use crate::error::DatumError;

/// Hard bound on Newton steps. Not expected to be reached.
pub const MAX_ITERATIONS: u32 = 1000;
/// Step size (degrees, per axis) below which the estimate is accepted.
pub const TOLERANCE_DEG: f64 = 1.0e-9;

/// Outcome of the inverse solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSolution {
    /// Final WGS-84 estimate.
    pub coord: GeoCoordinate,
    /// Number of Newton steps evaluated.
    pub iterations: u32,
    /// False when the cap was hit or the Jacobian degenerated.
    pub converged: bool,
}

/// Jacobian of `(lon, lat)_wgs → (lon, lat)_gcj`, degrees per degree.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Jacobian {
    dlongcj_dlonwgs: f64,
    dlongcj_dlatwgs: f64,
    dlatgcj_dlonwgs: f64,
    dlatgcj_dlatwgs: f64,
}

impl Jacobian {
    fn at(wgs: GeoCoordinate) -> Self {
        let x = wgs.lon - FRAME_ORIGIN_LON;
        let y = wgs.lat - FRAME_ORIGIN_LAT;
        let lon1 = LON_SERIES.eval(x, y);
        let lat1 = LAT_SERIES.eval(x, y);

        // Prime-vertical radius N and W = √(1 − e²sin²B), with their
        // derivatives per degree of latitude.
        let b = wgs.lat / 180.0 * PI;
        let (sin_b, cos_b) = b.sin_cos();
        let wsq = 1.0 - ECCENTRICITY_SQ * sin_b * sin_b;
        let w = wsq.sqrt();
        let n = SEMI_MAJOR_AXIS / w;
        let dw_dlatwgs = -PI * ECCENTRICITY_SQ * sin_b * cos_b / (180.0 * w);
        let dn_dlatwgs = -SEMI_MAJOR_AXIS * dw_dlatwgs / wsq;

        // gcj_lon = lon + 180·lon1 / (π·N·cosB)
        let pi_n_cos_b = PI * n * cos_b;
        let dlongcj_dlonwgs = 1.0 + 180.0 * lon1.d_dx / pi_n_cos_b;
        let dlongcj_dlatwgs = 180.0 * lon1.d_dy / pi_n_cos_b
            - 180.0 * lon1.value * PI * (dn_dlatwgs * cos_b - PI * n * sin_b / 180.0)
                / (pi_n_cos_b * pi_n_cos_b);

        // gcj_lat = lat + 180·lat1·W² / (π·N·(1 − e²))
        let pi_n_sub_ecc = PI * n * (1.0 - ECCENTRICITY_SQ);
        let dlatgcj_dlonwgs = 180.0 * wsq * lat1.d_dx / pi_n_sub_ecc;
        let dlatgcj_dlatwgs = 1.0
            + 180.0
                * (n * (lat1.d_dy * wsq + 2.0 * lat1.value * w * dw_dlatwgs)
                    - lat1.value * wsq * dn_dlatwgs)
                / (n * pi_n_sub_ecc);

        Self { dlongcj_dlonwgs, dlongcj_dlatwgs, dlatgcj_dlonwgs, dlatgcj_dlatwgs }
    }

    /// Cramer's rule for `J·(d_lon, d_lat) = (l_lon, l_lat)`.
    /// `None` when the determinant is zero or either step is non-finite.
    fn solve(&self, l_lon: f64, l_lat: f64) -> Option<(f64, f64)> {
        let det = self.dlongcj_dlonwgs * self.dlatgcj_dlatwgs
            - self.dlongcj_dlatwgs * self.dlatgcj_dlonwgs;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let d_lon = (l_lon * self.dlatgcj_dlatwgs - self.dlongcj_dlatwgs * l_lat) / det;
        let d_lat = (self.dlongcj_dlonwgs * l_lat - self.dlatgcj_dlonwgs * l_lon) / det;
        (d_lon.is_finite() && d_lat.is_finite()).then_some((d_lon, d_lat))
    }
}

/// Run the inverse and report how it went.
pub fn solve_wgs84(gcj: GeoCoordinate) -> InverseSolution {
    // Outside the box the forward map is the identity, so the first residual
    // is exactly zero and the input is its own preimage.
    if out_of_china(gcj.lat, gcj.lon) {
        return InverseSolution { coord: gcj, iterations: 0, converged: true };
    }

    let mut wgs = gcj;
    for iteration in 1..=MAX_ITERATIONS {
        let jacobian = Jacobian::at(wgs);
        let estimate = to_gcj02(wgs);
        let l_lon = gcj.lon - estimate.lon;
        let l_lat = gcj.lat - estimate.lat;

        let Some((d_lon, d_lat)) = jacobian.solve(l_lon, l_lat) else {
            log::debug!(
                "degenerate jacobian at ({}, {}) after {iteration} iterations",
                wgs.lon,
                wgs.lat
            );
            return InverseSolution { coord: wgs, iterations: iteration, converged: false };
        };

        if d_lat.abs() < TOLERANCE_DEG && d_lon.abs() < TOLERANCE_DEG {
            log::trace!("gcj02 inverse converged in {iteration} iterations");
            return InverseSolution { coord: wgs, iterations: iteration, converged: true };
        }
        wgs.lon += d_lon;
        wgs.lat += d_lat;
    }

    log::debug!(
        "gcj02 inverse hit the {MAX_ITERATIONS}-iteration cap at ({}, {})",
        wgs.lon,
        wgs.lat
    );
    InverseSolution { coord: wgs, iterations: MAX_ITERATIONS, converged: false }
}

/// GCJ-02 → WGS-84. Always returns the last estimate, converged or not.
pub fn to_wgs84(gcj: GeoCoordinate) -> GeoCoordinate {
    solve_wgs84(gcj).coord
}

/// GCJ-02 → WGS-84, failing when the solver stops without meeting the
/// tolerance.
pub fn to_wgs84_checked(gcj: GeoCoordinate) -> Result<GeoCoordinate, DatumError> {
    let solution = solve_wgs84(gcj);
    if solution.converged {
        Ok(solution.coord)
    } else {
        Err(DatumError::DidNotConverge {
            iterations: solution.iterations,
            lon: solution.coord.lon,
            lat: solution.coord.lat,
        })
    }
}
