/*
    Sattrain, parallel satellite train detection
    Copyright (C) 2024 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::env::{set_var, var};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use hifitime::Epoch;
use log::info;

use sattrain::elements::load_elements_from_path;
use sattrain::report::{export_csv, render_trains};
use sattrain::resolver::{GroundSite, Sgp4Resolver};
use sattrain::{SattrainError, TrainPipeline};

const LOG_VAR: &str = "SATTRAIN_LOG";

#[derive(Parser)]
#[command(
    name = "sattrain",
    about = "Detects satellite trains in a three-line element file",
    version
)]
struct Cli {
    /// Path to the three-line element file
    elements: PathBuf,

    /// Worker threads; defaults to the machine's available parallelism
    #[arg(short, long)]
    workers: Option<usize>,

    /// Reference instant in Gregorian UTC (e.g. "2024-01-20T19:32:39 UTC");
    /// defaults to now
    #[arg(long)]
    epoch: Option<String>,

    /// Also export one CSV row per train member to this path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Ground site as LAT,LON,ALT_KM; adds look angles to the report
    #[arg(long)]
    site: Option<String>,
}

fn main() -> Result<(), SattrainError> {
    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }
    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    let cli = Cli::parse();

    let epoch = match &cli.epoch {
        Some(text) => Epoch::from_str(text).map_err(|error| SattrainError::EpochFormat {
            epoch: text.clone(),
            details: error.to_string(),
        })?,
        None => Epoch::now().map_err(|error| SattrainError::EpochFormat {
            epoch: "now".to_string(),
            details: error.to_string(),
        })?,
    };
    let site = cli
        .site
        .as_deref()
        .map(GroundSite::from_spec)
        .transpose()?;

    let records = load_elements_from_path(&cli.elements)?;

    let mut pipeline = TrainPipeline::new(epoch);
    if let Some(workers) = cli.workers {
        pipeline = pipeline.with_workers(workers);
    }
    info!(
        "positioning {} records at {epoch} on {} workers",
        records.len(),
        pipeline.workers
    );

    let trains = pipeline.run(&records, &Sgp4Resolver);

    let stdout = io::stdout();
    render_trains(&mut stdout.lock(), &trains, site.as_ref())?;

    if let Some(csv_path) = &cli.csv {
        export_csv(csv_path, &trains)?;
    }

    Ok(())
}
