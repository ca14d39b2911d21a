#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive terminal dashboard over the robbery dataset.
//!
//! ```text
//! crime_dashboard [PATH]
//! ```
//!
//! `PATH` defaults to `$CRIME_DASHBOARD_DATA`, then `dados_roubos.csv` in the
//! working directory. A custom header layout can be supplied as a TOML file
//! through `$CRIME_DASHBOARD_SCHEMA`.
//!
//! Uses `indicatif-log-bridge` (via [`crime_dashboard_cli_utils::init_logger`])
//! so the load progress bar and log lines share the terminal cleanly.

mod interactive;
mod render;

use std::path::{Path, PathBuf};

use clap::Parser;
use crime_dashboard_cli_utils::IndicatifProgress;
use crime_dashboard_dataset::schema::DatasetSchema;

/// Dataset path used when neither the argument nor the environment
/// variable is set.
const DEFAULT_DATA_PATH: &str = "dados_roubos.csv";

/// Environment variable naming the dataset file.
const DATA_ENV: &str = "CRIME_DASHBOARD_DATA";

/// Environment variable naming a dataset schema TOML file.
const SCHEMA_ENV: &str = "CRIME_DASHBOARD_SCHEMA";

#[derive(Parser)]
#[command(
    name = "crime_dashboard",
    about = "Explore robbery incidents by municipality, neighborhood, and street"
)]
struct Cli {
    /// Path to the incident CSV
    path: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_dashboard_cli_utils::init_logger();
    let cli = Cli::parse();

    let path = cli
        .path
        .or_else(|| std::env::var_os(DATA_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

    let schema = match std::env::var_os(SCHEMA_ENV) {
        Some(schema_path) => DatasetSchema::from_file(Path::new(&schema_path))?,
        None => DatasetSchema::default(),
    };

    let progress = IndicatifProgress::bytes_bar(&multi, "Loading dataset");
    let dataset = match crime_dashboard_dataset::global::init(&path, &schema, &progress) {
        Ok(dataset) => dataset,
        Err(e) => {
            log::error!("Failed to load dataset from {}: {e}", path.display());
            return Err(e.into());
        }
    };

    println!("Robbery Incidents Dashboard");
    println!("{} incidents loaded from {}", dataset.len(), path.display());
    println!();

    interactive::run(dataset)
}
