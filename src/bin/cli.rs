//! track-profile CLI - builds elevation profiles for a folder of tracks
//!
//! Usage:
//!   track-profile [--meta-dir <dir>] [--route-dir <dir>] [--srtm-dir <dir>] [--output <file>]
//!
//! Reads every metadata file in the metadata folder, analyzes the GPX file it
//! names, corrects elevations against local SRTM tiles and writes all track
//! records as one JSON document for the presentation layer.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use track_profile::{pipeline, DistanceMetric, PipelineConfig, PipelineContext, SrtmDataset};

#[derive(Parser)]
#[command(name = "track-profile")]
#[command(about = "Recorded vs terrain-corrected elevation profiles for GPS tracks", long_about = None)]
struct Cli {
    /// Folder containing track metadata (*.json)
    #[arg(long, default_value = "./tracks/meta")]
    meta_dir: PathBuf,

    /// Folder route references are resolved against
    #[arg(long, default_value = "./tracks/route")]
    route_dir: PathBuf,

    /// Folder containing SRTM .hgt tiles
    #[arg(long, default_value = "./srtm")]
    srtm_dir: PathBuf,

    /// Maximum number of SRTM tiles kept mapped at once
    #[arg(long, default_value_t = track_profile::srtm::DEFAULT_CACHE_SIZE)]
    tile_cache: usize,

    /// Output file for the track records
    #[arg(short, long, default_value = "generated_tracks.json")]
    output: PathBuf,

    /// Metadata field naming the route file
    #[arg(long, default_value = "gpx")]
    route_field: String,

    /// Look up terrain at every point instead of sampling and interpolating
    #[arg(long)]
    no_smooth: bool,

    /// Spacing of terrain samples when smoothing (meters)
    #[arg(long, default_value = "100")]
    sample_interval: f64,

    /// Distance function: haversine or geodesic
    #[arg(long, default_value = "haversine")]
    metric: DistanceMetric,

    /// Enable verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let config = PipelineConfig {
        meta_dir: cli.meta_dir,
        route_dir: cli.route_dir,
        route_field: cli.route_field,
        smooth: !cli.no_smooth,
        sample_interval_meters: cli.sample_interval,
        distance_metric: cli.metric,
        output_path: cli.output,
    };

    match run(config, cli.srtm_dir, cli.tile_cache) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: PipelineConfig, srtm_dir: PathBuf, tile_cache: usize) -> track_profile::Result<()> {
    let dataset = SrtmDataset::with_cache_size(srtm_dir, tile_cache)?;
    info!("Using SRTM tiles from {}", dataset.dir().display());

    let output_path = config.output_path.clone();
    let context = PipelineContext::new(config, dataset);
    let records = pipeline::run(&context)?;
    pipeline::write_records(&records, &output_path)
}
