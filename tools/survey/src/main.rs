//! Round-trip accuracy and convergence sweep of the GCJ-02 inverse.
//! Walks a lon/lat grid over the China box (plus a margin), shifts each point
//! to GCJ-02 and solves back, then reports the worst error and iteration
//! statistics as JSON. Exits non-zero when the worst error exceeds --tolerance.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use sinomerc_core::datum::solver::MAX_ITERATIONS;
use sinomerc_core::datum::{CHINA_MAX_LAT, CHINA_MAX_LON, CHINA_MIN_LAT, CHINA_MIN_LON};
use sinomerc_core::{out_of_china, solve_wgs84, to_gcj02, GeoCoordinate};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "survey", about = "Sweep the China box and measure GCJ-02 round-trip error")]
struct Args {
    /// Grid spacing in degrees.
    #[arg(long, default_value = "0.25")]
    step: f64,

    /// Extra degrees swept around the box on every side.
    #[arg(long, default_value = "0.5")]
    margin: f64,

    /// Largest acceptable round-trip error in degrees.
    #[arg(long, default_value = "1e-6")]
    tolerance: f64,

    /// Write the report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone, Copy)]
struct Grid {
    min_lon: f64,
    max_lon: f64,
    min_lat: f64,
    max_lat: f64,
    step: f64,
}

#[derive(Serialize, Debug)]
struct Report {
    grid: Grid,
    points: usize,
    inside_box: usize,
    max_error_deg: f64,
    worst_point: Option<GeoCoordinate>,
    mean_iterations: f64,
    max_iterations: u32,
    /// Point count keyed by the number of solver iterations.
    iteration_histogram: BTreeMap<u32, usize>,
    not_converged: usize,
    hit_iteration_cap: usize,
}

/// Per-point measurement.
#[derive(Debug, Clone, Copy)]
struct Sample {
    wgs: GeoCoordinate,
    error: f64,
    iterations: u32,
    converged: bool,
}

fn measure(wgs: GeoCoordinate) -> Sample {
    let solution = solve_wgs84(to_gcj02(wgs));
    Sample {
        wgs,
        // NaN counts as the worst possible error
        error: match solution.coord.max_abs_diff(wgs) {
            e if e.is_nan() => f64::INFINITY,
            e => e,
        },
        iterations: solution.iterations,
        converged: solution.converged,
    }
}

fn axis(min: f64, max: f64, step: f64) -> Vec<f64> {
    let n = ((max - min) / step).floor() as usize;
    (0..=n).map(|i| min + i as f64 * step).collect()
}

fn survey(grid: Grid) -> Report {
    let lons = axis(grid.min_lon, grid.max_lon, grid.step);
    let lats = axis(grid.min_lat, grid.max_lat, grid.step);

    let samples: Vec<Sample> = lats
        .par_iter()
        .flat_map_iter(|&lat| lons.iter().map(move |&lon| measure(GeoCoordinate::new(lon, lat))))
        .collect();

    let inside_box = samples.iter().filter(|s| !out_of_china(s.wgs.lat, s.wgs.lon)).count();
    let worst = samples.iter().max_by(|a, b| a.error.total_cmp(&b.error));
    let mut iteration_histogram = BTreeMap::new();
    for s in &samples {
        *iteration_histogram.entry(s.iterations).or_insert(0) += 1;
    }
    let total_iterations: u64 = samples.iter().map(|s| u64::from(s.iterations)).sum();

    Report {
        grid,
        points: samples.len(),
        inside_box,
        max_error_deg: worst.map_or(0.0, |s| s.error),
        worst_point: worst.map(|s| s.wgs),
        mean_iterations: if samples.is_empty() {
            0.0
        } else {
            total_iterations as f64 / samples.len() as f64
        },
        max_iterations: samples.iter().map(|s| s.iterations).max().unwrap_or(0),
        iteration_histogram,
        not_converged: samples.iter().filter(|s| !s.converged).count(),
        hit_iteration_cap: samples.iter().filter(|s| s.iterations >= MAX_ITERATIONS).count(),
    }
}

fn check_step(step: f64) -> Result<()> {
    if step.is_nan() || step <= 0.0 {
        bail!("--step must be positive, got {step}");
    }
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    check_step(args.step)?;

    let grid = Grid {
        min_lon: CHINA_MIN_LON - args.margin,
        max_lon: CHINA_MAX_LON + args.margin,
        min_lat: CHINA_MIN_LAT - args.margin,
        max_lat: CHINA_MAX_LAT + args.margin,
        step: args.step,
    };
    eprintln!(
        "Sweeping lon {:.3}..{:.3}, lat {:.3}..{:.3} every {}° ...",
        grid.min_lon, grid.max_lon, grid.min_lat, grid.max_lat, grid.step
    );

    let report = survey(grid);
    eprintln!(
        "{} points ({} inside), max error {:.3e}°, mean {:.2} / max {} iterations, {} unconverged",
        report.points,
        report.inside_box,
        report.max_error_deg,
        report.mean_iterations,
        report.max_iterations,
        report.not_converged,
    );

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("  -> {}", path.display());
        }
        None => println!("{json}"),
    }

    if report.max_error_deg > args.tolerance {
        bail!(
            "max round-trip error {:.3e}° exceeds tolerance {:.3e}°",
            report.max_error_deg,
            args.tolerance
        );
    }
    Ok(())
}
