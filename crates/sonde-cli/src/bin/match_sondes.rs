//! Find sondes that were above an observer's horizon during a time window.
//!
//! Reads one summary file per sonde, logs every match and writes the
//! matching serials to a list for fetch_telemetry.

use anyhow::{Context, Result};
use clap::Parser;
use sonde_cli::{logging, write_serial_list, ObserverArgs};
use sonde_core::{load_summary_dir, matched_serials, sort_chronologically, HorizonFilter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder to read sonde summary data from
    #[arg(long, default_value = "summary_data/")]
    folder: PathBuf,

    /// Write out matching serial numbers to this file
    #[arg(long, default_value = "serial_matches.txt")]
    output: PathBuf,

    #[command(flatten)]
    observer: ObserverArgs,

    /// Log matches in time order instead of file order
    #[arg(long)]
    chronological: bool,

    /// Verbose output (set logging level to DEBUG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = args
        .observer
        .to_filter_config()
        .context("Invalid observer configuration")?;

    let observer = &config.observer;
    tracing::info!(
        "Observer position: ({}, {}, {}), min elevation {} deg",
        observer.lat(),
        observer.lon(),
        observer.altitude_m(),
        config.min_elevation_deg
    );
    match &config.window {
        Some(window) => tracing::info!(
            "Time window: {} to {}",
            window.start().to_rfc3339(),
            window.end().to_rfc3339()
        ),
        None => tracing::info!("Time window: all available data"),
    }

    let report = load_summary_dir(&args.folder)
        .with_context(|| format!("Failed to list {}", args.folder.display()))?;
    if !report.skipped.is_empty() {
        tracing::warn!("Skipped {} unusable summary files", report.skipped.len());
    }

    let filter = HorizonFilter::new(config);
    let mut matches = filter.run(&report.records);
    if args.chronological {
        sort_chronologically(&mut matches);
    }

    for m in &matches {
        tracing::info!(
            "Match! - {}: {} ({}) at {:.2} degrees elevation, {:.2} degrees azimuth, \
             {:.1} km range.",
            m.timestamp.to_rfc3339(),
            m.serial,
            m.slot,
            m.elevation_deg,
            m.azimuth_deg,
            m.range_m / 1000.0
        );
    }

    let serials = matched_serials(&matches);
    tracing::info!("Found {} matching flights.", serials.len());

    tracing::info!("Writing serial list to {}", args.output.display());
    write_serial_list(&args.output, &serials)?;

    Ok(())
}
