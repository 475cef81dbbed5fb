//! Shared pieces of the `geodist` and `geonearest` command line tools.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use geosort::geo_math::{exact_distance, MILES_TO_KILOMETER};
use geosort::{
    nearest_in_file, parse_point, MetricKind, Point, RadiusCutoff, SearchConfig,
    DEFAULT_RADIUS_KM,
};

/// Installs `env_logger`. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

/// Great-circle distance between two points
#[derive(Parser, Debug, Clone)]
#[command(name = "geodist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct DistArgs {
    /// First point, as `lat,lon` or `lat/lon`
    #[arg(allow_hyphen_values = true)]
    pub from: String,

    /// Second point, as `lat,lon` or `lat/lon`
    #[arg(allow_hyphen_values = true)]
    pub to: String,

    /// Report the distance in miles instead of kilometers
    #[arg(long)]
    pub miles: bool,

    /// Log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Computes the line `geodist` prints, e.g. `10.95 km`.
pub fn run_dist(args: &DistArgs) -> Result<String> {
    let a: Point<f64> = parse_point(&args.from)
        .with_context(|| format!("invalid first point {:?}", args.from))?;
    let b: Point<f64> = parse_point(&args.to)
        .with_context(|| format!("invalid second point {:?}", args.to))?;

    let km = exact_distance(a.lat, a.lon, b.lat, b.lon);
    log::debug!("{} -> {}: {} km", a, b, km);
    Ok(if args.miles {
        format!("{:.2} mi", km / MILES_TO_KILOMETER)
    } else {
        format!("{:.2} km", km)
    })
}

/// Nearest record in a file of 16-byte coordinate pairs
#[derive(Parser, Debug, Clone)]
#[command(name = "geonearest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct NearestArgs {
    /// Record file, sorted by latitude then longitude
    pub file: PathBuf,

    /// Query point, as `lat,lon` or `lat/lon`
    #[arg(allow_hyphen_values = true)]
    pub location: String,

    /// Records store latitude first (default is longitude first)
    #[arg(long)]
    pub lat_first: bool,

    /// Search radius in kilometers
    #[arg(short, long, default_value_t = DEFAULT_RADIUS_KM, env = "GEOSORT_RADIUS_KM")]
    pub radius: f64,

    /// Use the planar distance approximation
    #[arg(short, long)]
    pub approximate: bool,

    /// With --approximate, return the first hit even when it is outside the radius
    #[arg(long, requires = "approximate")]
    pub advisory: bool,

    /// Log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl NearestArgs {
    pub fn config(&self) -> SearchConfig {
        let metric = if self.approximate {
            MetricKind::Approximate
        } else {
            MetricKind::Exact
        };
        let cutoff = if self.advisory {
            RadiusCutoff::Advisory
        } else {
            RadiusCutoff::Hard
        };
        SearchConfig::new()
            .with_radius_km(self.radius)
            .with_metric(metric)
            .with_cutoff(cutoff)
            .with_lat_first(self.lat_first)
    }
}

/// Computes the line `geonearest` prints, or `None` when nothing is in range.
pub fn run_nearest(args: &NearestArgs) -> Result<Option<String>> {
    let query: Point<f64> = parse_point(&args.location)
        .with_context(|| format!("invalid location {:?}", args.location))?;
    let config = args.config();
    let found = nearest_in_file(&args.file, &query, &config)
        .with_context(|| format!("searching {}", args.file.display()))?;
    Ok(found.map(|record| record.to_string()))
}
