//! Empirical offset series of the GCJ-02 shift.
//!
//! Both series are a polynomial in the local frame (x = lon − 105,
//! y = lat − 35), a √|x| term, and three bands of two sine harmonics each
//! scaled by 2/3. The coefficients are fitted, not derived: they are reproduced
//! here as tables and must not be "simplified".
//!
//! [`Series::eval`] returns the value together with both partial derivatives,
//! so the forward shift and the inverse solver's Jacobian read the same table.
use std::f64::consts::PI;

/// Which local-frame variable a harmonic oscillates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// `coeff · x^x_pow · y^y_pow`
#[derive(Debug, Clone, Copy)]
pub struct Monomial {
    pub coeff: f64,
    pub x_pow: i32,
    pub y_pow: i32,
}

/// `amplitude · sin(frequency · π · v)` with v the chosen axis.
#[derive(Debug, Clone, Copy)]
pub struct Harmonic {
    pub amplitude: f64,
    pub frequency: f64,
    pub axis: Axis,
}

/// A pair of harmonics summed before the band weight is applied.
#[derive(Debug, Clone, Copy)]
pub struct Band(pub [Harmonic; 2]);

#[derive(Debug, Clone, Copy)]
pub struct Series {
    pub poly: &'static [Monomial],
    /// Weight of the `√|x|` term.
    pub sqrt_abs_x: f64,
    pub bands: [Band; 3],
}

/// Every band is scaled by 2/3.
pub const BAND_WEIGHT: f64 = 2.0 / 3.0;

const fn mono(coeff: f64, x_pow: i32, y_pow: i32) -> Monomial {
    Monomial { coeff, x_pow, y_pow }
}

const fn harm(amplitude: f64, frequency: f64, axis: Axis) -> Harmonic {
    Harmonic { amplitude, frequency, axis }
}

/// Shared by both series: the high-frequency band in x.
const X_RIPPLE: Band = Band([harm(20.0, 6.0, Axis::X), harm(20.0, 2.0, Axis::X)]);

/// Latitude offset (raw, roughly meters before scaling).
pub const LAT_SERIES: Series = Series {
    poly: &[
        mono(-100.0, 0, 0),
        mono(2.0, 1, 0),
        mono(3.0, 0, 1),
        mono(0.2, 0, 2),
        mono(0.1, 1, 1),
    ],
    sqrt_abs_x: 0.2,
    bands: [
        X_RIPPLE,
        Band([harm(20.0, 1.0, Axis::Y), harm(40.0, 1.0 / 3.0, Axis::Y)]),
        Band([harm(160.0, 1.0 / 12.0, Axis::Y), harm(320.0, 1.0 / 30.0, Axis::Y)]),
    ],
};

/// Longitude offset (raw, roughly meters before scaling).
pub const LON_SERIES: Series = Series {
    poly: &[
        mono(300.0, 0, 0),
        mono(1.0, 1, 0),
        mono(2.0, 0, 1),
        mono(0.1, 2, 0),
        mono(0.1, 1, 1),
    ],
    sqrt_abs_x: 0.1,
    bands: [
        X_RIPPLE,
        Band([harm(20.0, 1.0, Axis::X), harm(40.0, 1.0 / 3.0, Axis::X)]),
        Band([harm(150.0, 1.0 / 12.0, Axis::X), harm(300.0, 1.0 / 30.0, Axis::X)]),
    ],
};

/// Series value with its partials in the local frame. Since the frame is a
/// pure translation, these are also the partials w.r.t. WGS-84 lon/lat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesValue {
    pub value: f64,
    pub d_dx: f64,
    pub d_dy: f64,
}

impl Monomial {
    fn eval(&self, x: f64, y: f64) -> SeriesValue {
        let px = |p: i32| if p == 0 { 1.0 } else { x.powi(p) };
        let py = |p: i32| if p == 0 { 1.0 } else { y.powi(p) };
        let value = self.coeff * px(self.x_pow) * py(self.y_pow);
        let d_dx = if self.x_pow == 0 {
            0.0
        } else {
            self.coeff * f64::from(self.x_pow) * px(self.x_pow - 1) * py(self.y_pow)
        };
        let d_dy = if self.y_pow == 0 {
            0.0
        } else {
            self.coeff * f64::from(self.y_pow) * px(self.x_pow) * py(self.y_pow - 1)
        };
        SeriesValue { value, d_dx, d_dy }
    }
}

impl Harmonic {
    /// Returns (value, derivative along `self.axis`).
    fn eval(&self, x: f64, y: f64) -> (f64, f64) {
        let v = match self.axis {
            Axis::X => x,
            Axis::Y => y,
        };
        let arg = self.frequency * v * PI;
        (
            self.amplitude * arg.sin(),
            self.amplitude * self.frequency * PI * arg.cos(),
        )
    }
}

/// d/dx of `c·√|x|`. The derivative is unbounded at x = 0; it is defined as 0
/// there so the Jacobian stays finite at the frame origin.
pub fn sqrt_abs_derivative(c: f64, x: f64) -> f64 {
    if x > 0.0 {
        0.5 * c / x.sqrt()
    } else if x < 0.0 {
        -0.5 * c / (-x).sqrt()
    } else {
        0.0
    }
}

impl Series {
    pub fn eval(&self, x: f64, y: f64) -> SeriesValue {
        let mut out = SeriesValue { value: 0.0, d_dx: 0.0, d_dy: 0.0 };
        for m in self.poly {
            let t = m.eval(x, y);
            out.value += t.value;
            out.d_dx += t.d_dx;
            out.d_dy += t.d_dy;
        }
        out.value += self.sqrt_abs_x * x.abs().sqrt();
        out.d_dx += sqrt_abs_derivative(self.sqrt_abs_x, x);

        for Band(pair) in &self.bands {
            let (mut value, mut dv) = (0.0, 0.0);
            for h in pair {
                let (s, d) = h.eval(x, y);
                value += s;
                dv += d;
            }
            // Both harmonics of a band share an axis.
            out.value += value * BAND_WEIGHT;
            match pair[0].axis {
                Axis::X => out.d_dx += dv * BAND_WEIGHT,
                Axis::Y => out.d_dy += dv * BAND_WEIGHT,
            }
        }
        out
    }

    pub fn value(&self, x: f64, y: f64) -> f64 {
        self.eval(x, y).value
    }
}

/// Raw latitude offset at local-frame (x, y).
pub fn transform_lat(x: f64, y: f64) -> f64 {
    LAT_SERIES.value(x, y)
}

/// Raw longitude offset at local-frame (x, y).
pub fn transform_lon(x: f64, y: f64) -> f64 {
    LON_SERIES.value(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_lat(x: f64, y: f64) -> f64 {
        let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
        ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
        ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
        ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
        ret
    }

    fn reference_lon(x: f64, y: f64) -> f64 {
        let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
        ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
        ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
        ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
        ret
    }

    const SAMPLES: [(f64, f64); 6] = [
        (0.0, 0.0),
        (11.3975, 4.9085),
        (-33.0, -34.1),
        (32.8, 20.8),
        (-0.25, 0.75),
        (16.47, -12.3),
    ];

    #[test]
    fn table_matches_unrolled_formula() {
        for (x, y) in SAMPLES {
            assert_relative_eq!(transform_lat(x, y), reference_lat(x, y), epsilon = 1e-9);
            assert_relative_eq!(transform_lon(x, y), reference_lon(x, y), epsilon = 1e-9);
        }
    }

    #[test]
    fn partials_match_central_differences() {
        let h = 1e-6;
        // Stay away from x = 0 where √|x| has a kink.
        for (x, y) in SAMPLES.iter().copied().filter(|(x, _)| x.abs() > 0.1) {
            for series in [LAT_SERIES, LON_SERIES] {
                let v = series.eval(x, y);
                let fd_x = (series.value(x + h, y) - series.value(x - h, y)) / (2.0 * h);
                let fd_y = (series.value(x, y + h) - series.value(x, y - h)) / (2.0 * h);
                assert_relative_eq!(v.d_dx, fd_x, epsilon = 1e-4, max_relative = 1e-6);
                assert_relative_eq!(v.d_dy, fd_y, epsilon = 1e-4, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn sqrt_term_derivative_is_zero_at_origin() {
        assert_eq!(sqrt_abs_derivative(0.1, 0.0), 0.0);
        assert!((sqrt_abs_derivative(0.1, 4.0) - 0.025).abs() < 1e-15);
        assert!((sqrt_abs_derivative(0.1, -4.0) + 0.025).abs() < 1e-15);

        let v = LON_SERIES.eval(0.0, 0.0);
        assert!(v.d_dx.is_finite());
        assert!(v.d_dy.is_finite());
    }

    #[test]
    fn lat_partial_in_x_matches_closed_form() {
        // dlat1/dlon = 2 + 0.1·y + 0.1/√x + (120π cos 6πx + 40π cos 2πx)·2/3
        let (x, y) = (9.0_f64, 3.0_f64);
        let expected = 2.0
            + 0.1 * y
            + 2.0 * 0.05 / x.sqrt()
            + (120.0 * PI * (6.0 * PI * x).cos() + 40.0 * PI * (2.0 * PI * x).cos()) * 2.0 / 3.0;
        assert_relative_eq!(LAT_SERIES.eval(x, y).d_dx, expected, epsilon = 1e-9);
    }
}
