//! Download full telemetry for every serial in a match list.

use anyhow::Result;
use clap::Parser;
use sonde_cli::fetch::DEFAULT_BASE_URL;
use sonde_cli::{logging, read_serial_list, TelemetryClient};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial list written by match_sondes
    #[arg(long, default_value = "serial_matches.txt")]
    serials: PathBuf,

    /// Folder to write telemetry files into
    #[arg(long, default_value = "telemetry/")]
    output: PathBuf,

    /// Telemetry API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Download again even if a file already exists
    #[arg(long)]
    overwrite: bool,

    /// Verbose output (set logging level to DEBUG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let serials = read_serial_list(&args.serials)?;
    tracing::info!("Fetching telemetry for {} serials from {}", serials.len(), args.url);

    let client = TelemetryClient::new(args.url, Duration::from_secs(args.timeout))?;
    let summary = client.fetch_all(&serials, &args.output, args.overwrite)?;

    tracing::info!(
        "Downloaded {}, already present {}, failed {}",
        summary.downloaded.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    if !summary.failed.is_empty() {
        tracing::warn!("Failed serials: {}", summary.failed.join(", "));
    }

    Ok(())
}
