//! Convert an amateur payload telemetry export into KML.

use anyhow::{Context, Result};
use clap::Parser;
use sonde_cli::config::KmlArgs;
use sonde_cli::convert::amateur_export_to_kml;
use sonde_cli::logging;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Export to read, keyed by callsign
    #[arg(long, default_value = "amateur.json")]
    input: PathBuf,

    /// Write KML to this file
    #[arg(long, default_value = "amateur.kml")]
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

    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let doc = amateur_export_to_kml(&json, args.kml.to_options())?;
    doc.write_to(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!("Wrote {} flights to {}", doc.len(), args.output.display());
    Ok(())
}
