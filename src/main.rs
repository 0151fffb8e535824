//! Shot form analysis over a recorded landmark track.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use shot_form_analysis::{
    config::Config,
    landmarks::ShootingSide,
    pipeline::ShotPipeline,
    scoring::RangeScorer,
    track::{LandmarkTrack, PhaseLandmarkWriter, TrackPoseEstimator},
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Landmark track to analyze (JSON lines)
    #[arg(short, long)]
    track: PathBuf,

    /// Shooting side (left, right); overrides the config file
    #[arg(short, long, value_parser = parse_side)]
    side: Option<ShootingSide>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Directory for phase landmark snapshots; overrides the config file
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Skip range scoring
    #[arg(long)]
    no_score: bool,

    /// Pretty-print the JSON report
    #[arg(short, long)]
    pretty: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn parse_side(s: &str) -> std::result::Result<ShootingSide, String> {
    s.parse().map_err(|e: shot_form_analysis::Error| e.to_string())
}

fn load_config(path: Option<&PathBuf>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    info!("Loading configuration from: {}", path.display());
    match Config::from_file(path).and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config file: {e}. Using defaults.");
            Config::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(filter));

    let mut config = load_config(args.config.as_ref());
    if let Some(side) = args.side {
        config.analysis.shooting_side = side;
    }
    if args.pretty {
        config.output.pretty = true;
    }
    if let Some(dir) = args.snapshot_dir {
        config.output.snapshot_dir = Some(dir);
    }

    let mut track = LandmarkTrack::open(&args.track)
        .with_context(|| format!("Failed to open track {}", args.track.display()))?;
    let id = args.track.file_stem().map_or_else(|| "shot".into(), |s| s.to_string_lossy());
    let mut snapshots = PhaseLandmarkWriter::from_config(&config.output, &id)
        .context("Failed to prepare snapshot directory")?;

    let mut pipeline = ShotPipeline::new(&config);
    let mut report = pipeline.run(&mut track, &mut TrackPoseEstimator, &mut snapshots)?;

    if !args.no_score {
        report.apply_scorer(&RangeScorer::from_config(&config.scoring))?;
    }

    let json = if config.output.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}
