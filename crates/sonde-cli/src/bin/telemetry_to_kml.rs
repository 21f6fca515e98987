//! Bin downloaded telemetry files into a single KML document.

use anyhow::{Context, Result};
use clap::Parser;
use sonde_cli::config::KmlArgs;
use sonde_cli::convert::{json_files, telemetry_files_to_kml};
use sonde_cli::logging;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder to read sonde telemetry from
    #[arg(long, default_value = "telemetry/")]
    folder: PathBuf,

    /// Write KML to this file
    #[arg(long, default_value = "outputs.kml")]
    output: PathBuf,

    #[command(flatten)]
    kml: KmlArgs,

    /// Verbose output (set logging level to DEBUG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let files = json_files(&args.folder)?;
    tracing::info!("Working on {} files.", files.len());

    let doc = telemetry_files_to_kml(&files, args.kml.to_options());
    doc.write_to(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!("Wrote {} flights to {}", doc.len(), args.output.display());
    Ok(())
}
