//! Command-line converter between WGS-84, GCJ-02 and the Spherical Mercator
//! plane.
mod input;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use serde::Serialize;
use sinomerc_core::{datum, GeoCoordinate, PlanarPoint, ProjectionConfig, SphericalMercator};

#[derive(Parser, Debug)]
#[command(
    name = "sinomerc",
    version,
    about = "Convert coordinates between WGS-84, GCJ-02 and Spherical Mercator",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON projection config, e.g. {"useDistortedDatum": true}
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Treat the plane as GCJ-02 (overrides the config file)
    #[arg(long, global = true)]
    gcj02: bool,

    /// Print one JSON object per result instead of plain numbers
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// WGS-84 lon/lat to GCJ-02 lon/lat
    ToGcj02 {
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
    },

    /// GCJ-02 lon/lat to WGS-84 lon/lat
    ToWgs84 {
        /// Fail instead of printing an unconverged estimate
        #[arg(long)]
        strict: bool,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
    },

    /// WGS-84 lon/lat to plane x/y in meters
    Project {
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
    },

    /// Plane x/y in meters to WGS-84 lon/lat
    Unproject {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Convert one pair per line from a file or stdin
    Batch {
        op: Op,

        /// Input file; stdin when absent or "-"
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    ToGcj02,
    ToWgs84,
    Project,
    Unproject,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    let stdout = io::stdout();
    run(&cli, &mut stdout.lock())
}

fn projection(cli: &Cli) -> Result<SphericalMercator> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = ProjectionConfig::load(path)?;
            log::info!("loaded {}", path.display());
            config
        }
        None => ProjectionConfig::default(),
    };
    if cli.gcj02 {
        config.use_distorted_datum = true;
    }
    let projection = SphericalMercator::from_config(&config);
    log::debug!("datum mode {:?}", projection.mode());
    Ok(projection)
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let projection = projection(cli)?;
    let json = cli.json;

    match &cli.command {
        Commands::ToGcj02 { lon, lat } => {
            emit_geo(out, json, datum::to_gcj02(input::geo(*lon, *lat)?))
        }
        Commands::ToWgs84 { strict, lon, lat } => {
            let gcj = input::geo(*lon, *lat)?;
            let wgs = if *strict { datum::to_wgs84_checked(gcj)? } else { datum::to_wgs84(gcj) };
            emit_geo(out, json, wgs)
        }
        Commands::Project { lon, lat } => {
            emit_planar(out, json, projection.project(input::geo(*lon, *lat)?))
        }
        Commands::Unproject { x, y } => {
            emit_geo(out, json, projection.unproject(input::planar(*x, *y)?))
        }
        Commands::Batch { op, input } => {
            let reader: Box<dyn BufRead> = match input {
                Some(path) if path.as_os_str() != "-" => Box::new(BufReader::new(
                    File::open(path).with_context(|| format!("opening {}", path.display()))?,
                )),
                _ => Box::new(BufReader::new(io::stdin())),
            };
            run_batch(&projection, *op, reader, out, json)
        }
    }
}

fn run_batch(
    projection: &SphericalMercator,
    op: Op,
    reader: impl BufRead,
    out: &mut impl Write,
    json: bool,
) -> Result<()> {
    let mut count = 0usize;
    for (n, line) in reader.lines().enumerate() {
        let at = || format!("line {}", n + 1);
        let line = line.context("reading input")?;
        let Some((a, b)) = input::parse_pair(&line).with_context(at)? else {
            continue;
        };
        match op {
            Op::ToGcj02 => emit_geo(out, json, datum::to_gcj02(input::geo(a, b).with_context(at)?))?,
            Op::ToWgs84 => emit_geo(out, json, datum::to_wgs84(input::geo(a, b).with_context(at)?))?,
            Op::Project => {
                emit_planar(out, json, projection.project(input::geo(a, b).with_context(at)?))?
            }
            Op::Unproject => {
                emit_geo(out, json, projection.unproject(input::planar(a, b).with_context(at)?))?
            }
        }
        count += 1;
    }
    log::info!("converted {count} points");
    Ok(())
}

fn emit_geo(out: &mut impl Write, json: bool, c: GeoCoordinate) -> Result<()> {
    emit(out, json, &c, || format!("{:.9} {:.9}", c.lon, c.lat))
}

fn emit_planar(out: &mut impl Write, json: bool, p: PlanarPoint) -> Result<()> {
    emit(out, json, &p, || format!("{:.3} {:.3}", p.x, p.y))
}

fn emit<T: Serialize>(
    out: &mut impl Write,
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(value)?)?;
    } else {
        writeln!(out, "{}", text())?;
    }
    Ok(())
}
