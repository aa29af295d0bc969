//! Fleet Dataset Generator
//!
//! Writes a synthetic CSV workbook (operational, maintenance, occurrence
//! datasets) for testing VIGIL-PdM end to end.
//!
//! # Usage
//! ```bash
//! ./fleet-sim --seed 42 --out data/fleet
//! ./vigil-pdm --data-dir data/fleet
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use vigil_pdm::dataset::CsvWorkbook;
use vigil_pdm::sim::{self, FleetSimConfig};

#[derive(Parser, Debug)]
#[command(name = "fleet-sim")]
#[command(about = "Synthetic fleet dataset generator for VIGIL-PdM")]
#[command(version)]
struct Args {
    /// Output directory for the CSV workbook
    #[arg(long, default_value = "data/fleet")]
    out: PathBuf,

    /// Number of equipment units
    #[arg(long, default_value = "50")]
    units: u32,

    /// Days of operational readings
    #[arg(long, default_value = "153")]
    days: u32,

    /// Random seed for reproducibility
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Plant a stoppage streak on this unit id
    #[arg(long)]
    scenario_unit: Option<u32>,

    /// Suppress the summary line
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = FleetSimConfig {
        units: args.units,
        reading_days: args.days,
        seed: args.seed,
        ..Default::default()
    };
    let mut dataset = sim::generate(&config);
    if let Some(unit) = args.scenario_unit {
        sim::plant_stoppage_streak(&mut dataset, unit, 5, args.seed);
    }

    CsvWorkbook::new(&args.out)
        .write(&dataset)
        .with_context(|| format!("failed to write workbook to {}", args.out.display()))?;

    if !args.quiet {
        println!(
            "Wrote {} readings, {} maintenance events, {} occurrences to {}",
            dataset.operational.len(),
            dataset.maintenance.len(),
            dataset.occurrences.len(),
            args.out.display()
        );
    }
    Ok(())
}
