//! HTTP client for per-serial telemetry downloads.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// SondeHub endpoint returning the full telemetry of one serial.
pub const DEFAULT_BASE_URL: &str = "https://api.v2.sondehub.org/sonde";

/// Outcome of a batch download.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: Vec<String>,
    /// Already on disk and left alone
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// Downloads telemetry exports one serial at a time.
pub struct TelemetryClient {
    client: Client,
    base_url: String,
}

impl TelemetryClient {
    /// Create a new telemetry client.
    ///
    /// # Arguments
    /// * `base_url` - Endpoint prefix; the serial is appended as a path segment
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, serial: &str) -> String {
        format!("{}/{}", self.base_url, serial)
    }

    /// Fetch one serial's telemetry as raw JSON text.
    pub fn fetch(&self, serial: &str) -> Result<String> {
        let url = self.url_for(serial);
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Telemetry request for {} returned {}", serial, response.status());
        }

        let body = response
            .text()
            .with_context(|| format!("Failed to read telemetry body for {}", serial))?;

        // Reject anything that is not JSON before it lands on disk.
        serde_json::from_str::<serde_json::Value>(&body)
            .with_context(|| format!("Telemetry for {} is not valid JSON", serial))?;

        Ok(body)
    }

    /// Fetch every serial into `out_dir/<serial>.json`.
    ///
    /// Failures are logged and the batch continues; nothing is retried.
    pub fn fetch_all(
        &self,
        serials: &[String],
        out_dir: &Path,
        overwrite: bool,
    ) -> Result<FetchSummary> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;

        let mut summary = FetchSummary::default();
        for (i, serial) in serials.iter().enumerate() {
            let target = output_path(out_dir, serial);
            if target.exists() && !overwrite {
                tracing::debug!("{} already present, skipping", target.display());
                summary.skipped.push(serial.clone());
                continue;
            }

            tracing::info!("Fetching {} ({}/{})", serial, i + 1, serials.len());
            let result = self
                .fetch(serial)
                .and_then(|body| write_replacing(&target, &body));

            match result {
                Ok(()) => summary.downloaded.push(serial.clone()),
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {:#}", serial, e);
                    summary.failed.push(serial.clone());
                }
            }
        }

        Ok(summary)
    }
}

/// Write `body` beside `target` and rename it into place, so an interrupted
/// write never leaves a truncated file that a later run would skip.
fn write_replacing(target: &Path, body: &str) -> Result<()> {
    let mut partial = target.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let written = fs::write(&partial, body)
        .with_context(|| format!("Failed to write {}", partial.display()))
        .and_then(|()| {
            fs::rename(&partial, target)
                .with_context(|| format!("Failed to move telemetry into {}", target.display()))
        });
    if written.is_err() && partial.is_file() {
        let _ = fs::remove_file(&partial);
    }
    written
}

/// File a serial's telemetry is stored under.
pub fn output_path(out_dir: &Path, serial: &str) -> PathBuf {
    let safe: String = serial
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    out_dir.join(format!("{safe}.json"))
}
