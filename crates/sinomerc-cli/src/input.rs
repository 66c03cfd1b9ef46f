//! Parsing and validation of user-supplied numbers.
//!
//! The core library accepts anything; range checks live here, at the edge.
use anyhow::{bail, Context, Result};
use sinomerc_core::{GeoCoordinate, PlanarPoint};

/// Reject coordinates a GPS could not have produced.
pub fn geo(lon: f64, lat: f64) -> Result<GeoCoordinate> {
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        bail!("longitude {lon} is outside [-180, 180]");
    }
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        bail!("latitude {lat} is outside [-90, 90]");
    }
    Ok(GeoCoordinate::new(lon, lat))
}

pub fn planar(x: f64, y: f64) -> Result<PlanarPoint> {
    if !x.is_finite() || !y.is_finite() {
        bail!("planar point ({x}, {y}) is not finite");
    }
    Ok(PlanarPoint::new(x, y))
}

/// One batch line: two numbers separated by whitespace and/or a comma.
/// Blank lines and `#` comments give `None`.
pub fn parse_pair(line: &str) -> Result<Option<(f64, f64)>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }
    let fields: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    let [a, b] = fields.as_slice() else {
        bail!("expected two numbers, got {}: {line:?}", fields.len());
    };
    let a: f64 = a.parse().with_context(|| format!("not a number: {a:?}"))?;
    let b: f64 = b.parse().with_context(|| format!("not a number: {b:?}"))?;
    Ok(Some((a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_accept_commas_and_spaces() {
        assert_eq!(parse_pair("116.3975, 39.9085").unwrap(), Some((116.3975, 39.9085)));
        assert_eq!(parse_pair("  -73.9857\t40.7484 ").unwrap(), Some((-73.9857, 40.7484)));
        assert_eq!(parse_pair("1,2 # trailing note").unwrap(), Some((1.0, 2.0)));
    }

    #[test]
    fn blanks_and_comments_are_skipped() {
        assert_eq!(parse_pair("").unwrap(), None);
        assert_eq!(parse_pair("   # header").unwrap(), None);
    }

    #[test]
    fn wrong_arity_and_garbage_fail() {
        assert!(parse_pair("1 2 3").is_err());
        assert!(parse_pair("1").is_err());
        assert!(parse_pair("east 2").is_err());
    }

    #[test]
    fn geo_ranges_are_enforced() {
        assert!(geo(180.0, -90.0).is_ok());
        assert!(geo(180.5, 0.0).is_err());
        assert!(geo(0.0, 91.0).is_err());
        assert!(geo(f64::NAN, 0.0).is_err());
        assert!(planar(f64::INFINITY, 0.0).is_err());
        assert!(planar(1.0e7, -1.0e7).is_ok());
    }
}
