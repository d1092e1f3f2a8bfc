//! Run the lower-mantle scenarios against PREM and print a comparison table.
//!
//! Usage: `lower-mantle [--config FILE] [--csv FILE] [--tomography FILE --longitude DEG]`

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process;

use lower_mantle_rust::error::{MantleError, Result};
use lower_mantle_rust::report::ComparisonReport;
use lower_mantle_rust::scenario::{ScenarioConfig, run_scenarios};
use lower_mantle_rust::seismic::Prem;
use lower_mantle_rust::tomography::TomographySection;

#[derive(Parser, Debug)]
#[command(name = "lower-mantle")]
#[command(about = "Compare lower-mantle rock scenarios with PREM")]
struct Args {
    /// Scenario JSON; the built-in pyrolite scenarios when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the comparison table as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Tomography section JSON to add as an observed dVs/Vs column
    #[arg(long)]
    tomography: Option<PathBuf>,

    /// Longitude (degrees) of the tomography profile to use
    #[arg(long, default_value_t = 0.0)]
    longitude: f64,
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => ScenarioConfig::from_file(path)?,
        None => ScenarioConfig::embedded()?,
    };

    let outcome = run_scenarios(&config, &Prem::new())?;
    let mut report = ComparisonReport::from_outcome(&outcome)?;

    if let Some(path) = &args.tomography {
        let section = TomographySection::from_file(path)?;
        let index = section.nearest_profile(args.longitude).ok_or_else(|| {
            MantleError::Evaluation(format!("{} has no profiles", path.display()))
        })?;
        info!(
            "tomography profile {} at {:.1}°",
            index, section.longitudes[index]
        );
        let dvs = section.profile_at_depths(index, report.depths_m())?;
        report.add_column(
            &format!("tomography {:.1}° dVs/Vs %", section.longitudes[index]),
            dvs.iter().map(|v| v * 100.0).collect(),
        )?;
    }

    report.print_table();

    if let Some(path) = &args.csv {
        report.write_csv(path)?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!("{}", err);
        process::exit(1);
    }
}
