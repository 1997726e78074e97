#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Yelp business digest.
//!
//! With no arguments, processes `data/` into `data/processed/` unless the
//! export already exists, then reports on California businesses.

use std::path::PathBuf;

use clap::Parser;
use yelp_digest_cli_utils::IndicatifProgress;
use yelp_digest_process::{RunOptions, paths};

#[derive(Parser)]
#[command(name = "yelp_digest", about = "Yelp business dump digest")]
struct Cli {
    /// Directory searched for `yelp_academic_dataset_business.json`
    /// (its parent is searched too). Defaults to the workspace `data/`.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Output directory. Defaults to `<data-dir>/processed`.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Reprocess the raw dump even if `businesses.csv` already exists
    #[arg(long)]
    force: bool,
    /// State code to report on
    #[arg(long, default_value = "CA")]
    state: String,
    /// Number of categories kept in `top_categories.json`
    #[arg(long, default_value = "200")]
    top: usize,
    /// Also write `<state>_restaurants.json` for the map page
    #[arg(long)]
    map_points: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = yelp_digest_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut options = RunOptions::new(cli.data_dir.unwrap_or_else(paths::data_dir));
    if let Some(output_dir) = cli.output_dir {
        options.output_dir = output_dir;
    }
    options.force = cli.force;
    options.state = cli.state;
    options.top_categories = cli.top;
    options.map_points = cli.map_points;

    let progress = IndicatifProgress::input_bar(&multi, "Processing businesses");
    let outcome = yelp_digest_process::run(&options, &progress)?;

    if let Some(result) = &outcome.processed {
        log::info!(
            "Processed {} businesses in {:.1}s",
            result.rows_written,
            result.duration.as_secs_f64()
        );
        log::info!("Wrote outputs:");
        log::info!(" - businesses_csv: {}", result.businesses_csv.display());
        log::info!(" - states_summary: {}", result.states_summary.display());
        log::info!(" - top_categories: {}", result.top_categories.display());
    }

    if let Some(path) = &outcome.map_points {
        log::info!(" - map_points: {}", path.display());
    }

    Ok(())
}
