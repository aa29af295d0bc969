//! VIGIL-PdM — equipment scan console
//!
//! Loads the fleet datasets, runs one complete scan, and renders the
//! resulting alerts and recommendations. The scan core is pure; this
//! binary is the side-effecting presentation consumer.
//!
//! # Usage
//!
//! ```bash
//! # Scan a CSV workbook directory
//! vigil-pdm --data-dir data/fleet
//!
//! # Scan a synthetic fleet (no data on disk required)
//! vigil-pdm --simulate --seed 42
//!
//! # Machine-readable output
//! vigil-pdm --simulate --json
//! ```
//!
//! # Environment Variables
//!
//! - `VIGIL_CONFIG`: Path to a scan config TOML (default: ./vigil.toml)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use vigil_pdm::dataset::{CsvWorkbook, RecordStore};
use vigil_pdm::sim::{self, FleetSimConfig};
use vigil_pdm::types::ScanReport;
use vigil_pdm::{run_scan, ScanConfig};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "vigil-pdm")]
#[command(about = "VIGIL-PdM Predictive Maintenance Intelligence")]
#[command(version)]
struct CliArgs {
    /// Directory holding the CSV workbook
    /// (operational.csv, maintenance.csv, occurrences.csv)
    #[arg(long, conflicts_with = "simulate")]
    data_dir: Option<PathBuf>,

    /// Scan a synthetic fleet instead of on-disk data
    #[arg(long)]
    simulate: bool,

    /// Seed for the synthetic fleet (also overrides the scan seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Fleet size for --simulate
    #[arg(long, default_value = "50")]
    units: u32,

    /// Plant a stoppage streak on this unit id (--simulate only)
    #[arg(long)]
    scenario_unit: Option<u32>,

    /// Emit the scan report as JSON instead of console text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = ScanConfig::load().context("failed to load scan config")?;
    config.validate().context("invalid scan config")?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let dataset = if args.simulate {
        let sim_config = FleetSimConfig {
            units: args.units,
            seed: config.seed,
            ..Default::default()
        };
        let mut dataset = sim::generate(&sim_config);
        if let Some(unit) = args.scenario_unit {
            let planted = sim::plant_stoppage_streak(&mut dataset, unit, 5, config.seed);
            info!(unit, planted, "stoppage scenario planted");
        }
        dataset
    } else if let Some(dir) = &args.data_dir {
        CsvWorkbook::new(dir)
            .load()
            .with_context(|| format!("failed to load workbook from {}", dir.display()))?
    } else {
        bail!("either --data-dir or --simulate is required");
    };

    let report = run_scan(&dataset, &config).context("scan failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_console(&report);
    }
    Ok(())
}

// ============================================================================
// Console Renderer
// ============================================================================

fn render_console(report: &ScanReport) {
    println!("\nCRITICAL ALERTS:");
    if report.alerts.is_empty() {
        println!("  (none)");
    }
    for alert in &report.alerts {
        println!(
            "\n[!] ALERT: {} (Equipment ID {})",
            alert.equipment_name, alert.equipment_id
        );
        for message in &alert.messages {
            println!("  - {message}");
        }
    }

    println!("\nMAINTENANCE RECOMMENDATIONS:");
    if report.recommendations.is_empty() {
        println!("  (none)");
    }
    for rec in &report.recommendations {
        println!(
            "\n[{}] {} (Equipment ID {}):",
            rec.priority, rec.equipment_name, rec.equipment_id
        );
        for action in &rec.actions {
            println!("  * {action}");
        }
    }

    if let Some(eval) = &report.evaluation {
        println!(
            "\nModel evaluation: accuracy {:.2} over {} held-out rows \
             (failure class: precision {:.2}, recall {:.2})",
            eval.accuracy, eval.n_samples, eval.failure.precision, eval.failure.recall
        );
    }
    println!("\nUnits scored: {}", report.units_scored);
}
